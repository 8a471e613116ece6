use serde::{Serialize, Serializer};
use std::fmt;

/// Placeholder text stored when no rule matched a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    UnknownProduct,
    UnknownWeight,
    /// Price miss for labels that print a plain currency price.
    UnknownPricePerPiece,
    /// Price miss for labels that print a per-unit token price.
    UnknownPrice,
    UnknownBarcode,
}

impl Sentinel {
    pub fn as_str(self) -> &'static str {
        match self {
            Sentinel::UnknownProduct => "Unknown Product",
            Sentinel::UnknownWeight => "Unknown Weight",
            Sentinel::UnknownPricePerPiece => "Unknown Price per Piece",
            Sentinel::UnknownPrice => "Unknown Price",
            Sentinel::UnknownBarcode => "Unknown Barcode",
        }
    }
}

impl fmt::Display for Sentinel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single label field: either a value read off the label (possibly empty,
/// when typed in by hand) or the sentinel for a pattern miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldValue {
    Known(String),
    Unknown(Sentinel),
}

impl FieldValue {
    pub fn known(value: impl Into<String>) -> Self {
        FieldValue::Known(value.into())
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, FieldValue::Unknown(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Known(v) => v,
            FieldValue::Unknown(s) => s.as_str(),
        }
    }

    /// `Some(value)` for a match, `None` for a sentinel.
    pub fn value(&self) -> Option<&str> {
        match self {
            FieldValue::Known(v) => Some(v),
            FieldValue::Unknown(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Structured fields extracted from one price label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ParsedLabel {
    pub product_name: FieldValue,
    pub weight: FieldValue,
    pub price_per_unit: FieldValue,
}

impl ParsedLabel {
    /// Fields typed in by the user are taken verbatim, empty strings included.
    pub fn manual(
        product_name: impl Into<String>,
        weight: impl Into<String>,
        price_per_unit: impl Into<String>,
    ) -> Self {
        ParsedLabel {
            product_name: FieldValue::known(product_name),
            weight: FieldValue::known(weight),
            price_per_unit: FieldValue::known(price_per_unit),
        }
    }

    pub fn is_complete(&self) -> bool {
        !(self.product_name.is_unknown() || self.weight.is_unknown() || self.price_per_unit.is_unknown())
    }
}
