use std::fmt;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use shelftag_core::{Barcode, ParsedLabel, ScanRecord};
use shelftag_ocr::has_supported_extension;

/// Blocking message shown to the user after each action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Saved(ScanRecord),
    NotSaved,
    Failed(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Saved(r) => write!(f, "Data has been saved to the database (record #{}).", r.id),
            Notice::NotSaved => write!(f, "Data was not saved to the database."),
            Notice::Failed(message) => write!(f, "Error: {message}"),
        }
    }
}

/// Label fields typed in by hand.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualEntry {
    pub product_name: String,
    pub weight: String,
    pub price_per_piece: String,
    pub barcode: String,
}

/// Everything the sessions need from the user. Implementations block until
/// the user has answered.
pub trait InteractionShell {
    /// Next image to scan; `None` ends the session.
    fn pick_image(&mut self) -> Option<PathBuf>;
    fn show_fields(&mut self, label: &ParsedLabel, barcode: &Barcode);
    fn confirm(&mut self, label: &ParsedLabel, barcode: &Barcode) -> bool;
    /// Next hand-entered label; `None` ends the session.
    fn read_manual_entry(&mut self) -> Option<ManualEntry>;
    fn notify(&mut self, notice: &Notice);
}

/// Line-oriented shell over any reader/writer pair (stdin/stdout in the binary).
pub struct TerminalShell<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalShell<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, args: fmt::Arguments<'_>) {
        if let Err(e) = self.output.write_fmt(args).and_then(|_| self.output.flush()) {
            tracing::warn!("Terminal write failed: {e}");
        }
    }

    /// `None` on end of input or a read error.
    fn prompt(&mut self, question: &str) -> Option<String> {
        self.say(format_args!("{question}"));
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::warn!("Terminal read failed: {e}");
                None
            }
        }
    }

    fn field_block(label: &ParsedLabel, barcode: &Barcode) -> String {
        format!(
            "Product Name: {}\nWeight: {}\nPrice per Piece: {}\nBarcode: {}\n",
            label.product_name, label.weight, label.price_per_unit, barcode
        )
    }
}

impl<R: BufRead, W: Write> InteractionShell for TerminalShell<R, W> {
    fn pick_image(&mut self) -> Option<PathBuf> {
        loop {
            let answer = self.prompt("Select a label image (png/jpg/jpeg/bmp, empty to quit): ")?;
            let answer = answer.trim();
            if answer.is_empty() {
                return None;
            }
            let path = PathBuf::from(answer);
            if has_supported_extension(&path) {
                return Some(path);
            }
            self.say(format_args!("Not an image file: {}\n", path.display()));
        }
    }

    fn show_fields(&mut self, label: &ParsedLabel, barcode: &Barcode) {
        let block = Self::field_block(label, barcode);
        self.say(format_args!("\n{block}"));
    }

    fn confirm(&mut self, label: &ParsedLabel, barcode: &Barcode) -> bool {
        let block = Self::field_block(label, barcode);
        let question = format!("Is this correct?\n\n{block}[y/N]: ");
        matches!(
            self.prompt(&question).map(|a| a.trim().to_lowercase()).as_deref(),
            Some("y" | "yes")
        )
    }

    fn read_manual_entry(&mut self) -> Option<ManualEntry> {
        loop {
            let choice = self.prompt("[i]nput data or [q]uit: ")?;
            match choice.trim().to_lowercase().as_str() {
                "i" | "input" => break,
                "q" | "quit" => return None,
                _ => continue,
            }
        }
        Some(ManualEntry {
            product_name: self.prompt("Product Name: ")?,
            weight: self.prompt("Weight (e.g., 180g): ")?,
            price_per_piece: self.prompt("Price per Piece (e.g., 1.99 €): ")?,
            barcode: self.prompt("Barcode: ")?,
        })
    }

    fn notify(&mut self, notice: &Notice) {
        self.say(format_args!("{notice}\n"));
    }
}
