use std::sync::OnceLock;

use regex::Regex;
use shelftag_core::{FieldValue, LabelStrategy, ParsedLabel, Sentinel};

// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_weight, r"(?i)\d+\s?g");
re!(re_weight_fused, r"(?i)\d+g");
re!(re_digits, r"\d+");
re!(re_alphabetic_line, r"^[A-Za-z\s]+$");

/// Symbol fusions the OCR engine is known to produce, rewritten in the merged
/// text before any price matching.
const OCR_FIXUPS: &[(&str, &str)] = &[("€lkom", "€/kom")];

/// Line boundaries recognized in engine output. A bare `\r` counts too; some
/// engines emit it between lines.
const LINE_BREAKS: &[char] = &[
    '\n', '\r', '\x0b', '\x0c', '\x1c', '\x1d', '\x1e', '\u{85}', '\u{2028}', '\u{2029}',
];

// ── Public parsing API ───────────────────────────────────────────────────────

/// Strategy-specific rules, compiled once per parser.
#[derive(Debug, Clone)]
enum Rules {
    Generic { currency: String, price: Regex },
    Alphabetic { unit_token: String, price: Regex },
}

/// Turns raw OCR text from one label into a [`ParsedLabel`].
///
/// Never fails: a field no rule matches comes back as its sentinel.
#[derive(Debug, Clone)]
pub struct LabelParser {
    rules: Rules,
}

impl LabelParser {
    pub fn new(strategy: &LabelStrategy) -> Self {
        let rules = match strategy {
            LabelStrategy::GenericAccumulation { currency } => Rules::Generic {
                price: compile_token_pattern(r"(\d+[.,]\d+)\s*", currency),
                currency: currency.clone(),
            },
            LabelStrategy::AlphabeticFirstLine { unit_token } => Rules::Alphabetic {
                price: compile_token_pattern(r"\b(\d+[.,]\d+|\d{3,})\s?", unit_token),
                unit_token: unit_token.clone(),
            },
        };
        Self { rules }
    }

    pub fn parse(&self, ocr_text: &str) -> ParsedLabel {
        let lines = clean_lines(ocr_text);
        tracing::debug!(?lines, "cleaned OCR lines");

        let merged = merge_lines(&lines);
        tracing::debug!(%merged, "merged OCR text");

        let (product_name, price_per_unit) = match &self.rules {
            Rules::Generic { currency, price } => (
                accumulate_product_name(&lines, currency),
                extract_decimal_price(&merged, price, currency),
            ),
            Rules::Alphabetic { unit_token, price } => (
                first_alphabetic_line(&lines),
                extract_unit_price(&merged, price, unit_token),
            ),
        };
        let weight = extract_weight(&lines);

        let label = ParsedLabel { product_name, weight, price_per_unit };
        tracing::debug!(
            product_name = %label.product_name,
            weight = %label.weight,
            price_per_unit = %label.price_per_unit,
            "parsed label"
        );
        label
    }
}

/// One-shot convenience over [`LabelParser`].
pub fn parse_label(ocr_text: &str, strategy: &LabelStrategy) -> ParsedLabel {
    LabelParser::new(strategy).parse(ocr_text)
}

fn compile_token_pattern(prefix: &str, token: &str) -> Regex {
    Regex::new(&format!("{prefix}{}", regex::escape(token))).expect("escaped token pattern")
}

// ── Preprocessing ────────────────────────────────────────────────────────────

fn clean_lines(text: &str) -> Vec<&str> {
    text.split(LINE_BREAKS).map(str::trim).filter(|l| !l.is_empty()).collect()
}

fn merge_lines(lines: &[&str]) -> String {
    let mut merged = lines.join(" ");
    for (fused, fixed) in OCR_FIXUPS {
        if merged.contains(fused) {
            merged = merged.replace(fused, fixed);
        }
    }
    merged
}

// ── Product name ─────────────────────────────────────────────────────────────

fn accumulate_product_name(lines: &[&str], currency: &str) -> FieldValue {
    let parts: Vec<&str> = lines
        .iter()
        .copied()
        .take_while(|l| {
            !(re_weight_fused().is_match(l)
                || (!currency.is_empty() && l.contains(currency))
                || re_digits().is_match(l))
        })
        .collect();

    if parts.is_empty() {
        FieldValue::Unknown(Sentinel::UnknownProduct)
    } else {
        FieldValue::known(parts.join(" "))
    }
}

fn first_alphabetic_line(lines: &[&str]) -> FieldValue {
    lines
        .iter()
        .find(|l| re_alphabetic_line().is_match(l))
        .map(|l| FieldValue::known(*l))
        .unwrap_or(FieldValue::Unknown(Sentinel::UnknownProduct))
}

// ── Weight ───────────────────────────────────────────────────────────────────

fn extract_weight(lines: &[&str]) -> FieldValue {
    lines
        .iter()
        .find(|l| re_weight().is_match(l))
        .map(|l| FieldValue::known(*l))
        .unwrap_or(FieldValue::Unknown(Sentinel::UnknownWeight))
}

// ── Price ────────────────────────────────────────────────────────────────────

fn extract_decimal_price(merged: &str, price: &Regex, currency: &str) -> FieldValue {
    match price.captures(merged).and_then(|c| c.get(1)) {
        Some(m) => FieldValue::known(format!("{} {currency}", m.as_str().replace(',', "."))),
        None => FieldValue::Unknown(Sentinel::UnknownPricePerPiece),
    }
}

fn extract_unit_price(merged: &str, price: &Regex, unit_token: &str) -> FieldValue {
    match price.captures(merged).and_then(|c| c.get(1)) {
        Some(m) => FieldValue::known(format!("{} {unit_token}", restore_decimal_point(m.as_str()))),
        None => FieldValue::Unknown(Sentinel::UnknownPrice),
    }
}

/// Labels print cents in superscript, which OCR reads as a plain digit run:
/// "427" becomes "4.27". Runs of two digits or fewer, and anything already
/// carrying a separator, pass through untouched.
fn restore_decimal_point(raw: &str) -> String {
    if raw.len() > 2 && raw.bytes().all(|b| b.is_ascii_digit()) {
        let (whole, cents) = raw.split_at(raw.len() - 2);
        format!("{whole}.{cents}")
    } else {
        raw.to_string()
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
