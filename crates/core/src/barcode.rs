use serde::{Serialize, Serializer};
use std::fmt;

use crate::label::Sentinel;

/// Barcode payload as handed over by a decoder, decoration included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawBarcode {
    Text(String),
    Bytes(Vec<u8>),
}

impl From<&str> for RawBarcode {
    fn from(s: &str) -> Self {
        RawBarcode::Text(s.to_string())
    }
}

impl From<String> for RawBarcode {
    fn from(s: String) -> Self {
        RawBarcode::Text(s)
    }
}

impl From<&[u8]> for RawBarcode {
    fn from(b: &[u8]) -> Self {
        RawBarcode::Bytes(b.to_vec())
    }
}

impl<const N: usize> From<&[u8; N]> for RawBarcode {
    fn from(b: &[u8; N]) -> Self {
        RawBarcode::Bytes(b.to_vec())
    }
}

impl From<Vec<u8>> for RawBarcode {
    fn from(b: Vec<u8>) -> Self {
        RawBarcode::Bytes(b)
    }
}

/// Barcode attached to a label.
///
/// Decoded barcodes are digits-only or unknown. A barcode typed in by hand is
/// kept exactly as entered, empty included, and never collapses to the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Barcode {
    Digits(String),
    Entered(String),
    Unknown,
}

impl Barcode {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Barcode::Unknown)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Barcode::Digits(d) | Barcode::Entered(d) => d,
            Barcode::Unknown => Sentinel::UnknownBarcode.as_str(),
        }
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Barcode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Strip everything but ASCII digits from a decoded barcode.
///
/// Bytes that are not valid UTF-8 count as no barcode at all.
pub fn normalize_barcode(raw: Option<RawBarcode>) -> Barcode {
    let text = match raw {
        Some(RawBarcode::Text(s)) => s,
        Some(RawBarcode::Bytes(b)) => match String::from_utf8(b) {
            Ok(s) => s,
            Err(_) => return Barcode::Unknown,
        },
        None => return Barcode::Unknown,
    };

    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        Barcode::Unknown
    } else {
        Barcode::Digits(digits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_decoration() {
        assert_eq!(
            normalize_barcode(Some("811-234-567 ".into())),
            Barcode::Digits("811234567".into())
        );
    }

    #[test]
    fn absent_is_unknown() {
        assert_eq!(normalize_barcode(None), Barcode::Unknown);
        assert_eq!(normalize_barcode(None).to_string(), "Unknown Barcode");
    }

    #[test]
    fn bytes_are_decoded_first() {
        assert_eq!(
            normalize_barcode(Some(b"12-34".into())),
            Barcode::Digits("1234".into())
        );
    }

    #[test]
    fn invalid_utf8_is_unknown() {
        assert_eq!(
            normalize_barcode(Some(vec![0x31u8, 0xff, 0x32].into())),
            Barcode::Unknown
        );
    }

    #[test]
    fn no_digits_is_unknown() {
        assert_eq!(normalize_barcode(Some("".into())), Barcode::Unknown);
        assert_eq!(normalize_barcode(Some("ABC-".into())), Barcode::Unknown);
    }

    #[test]
    fn entered_barcode_is_verbatim() {
        assert_eq!(Barcode::Entered("385-0123".into()).to_string(), "385-0123");
        let blank = Barcode::Entered(String::new());
        assert!(!blank.is_unknown());
        assert_eq!(blank.as_str(), "");
    }

    #[test]
    fn non_ascii_digits_are_dropped() {
        // Arabic-Indic digits are numeric but not ASCII.
        assert_eq!(
            normalize_barcode(Some("4٣0".into())),
            Barcode::Digits("40".into())
        );
    }
}
