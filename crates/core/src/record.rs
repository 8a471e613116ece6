use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::barcode::Barcode;
use crate::label::ParsedLabel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A confirmed scan, not yet written. Sentinels are carried as their text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScanRecord {
    pub product_name: String,
    pub weight: String,
    pub price_per_piece: String,
    pub barcode: String,
}

impl NewScanRecord {
    pub fn from_scan(label: &ParsedLabel, barcode: &Barcode) -> Self {
        NewScanRecord {
            product_name: label.product_name.to_string(),
            weight: label.weight.to_string(),
            price_per_piece: label.price_per_unit.to_string(),
            barcode: barcode.to_string(),
        }
    }
}

/// A row of the scan table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    pub id: RecordId,
    pub product_name: String,
    pub weight: String,
    pub price_per_piece: String,
    pub barcode: String,
    pub created_at: DateTime<Utc>,
}

impl ScanRecord {
    pub fn new(id: RecordId, record: NewScanRecord, created_at: DateTime<Utc>) -> Self {
        ScanRecord {
            id,
            product_name: record.product_name,
            weight: record.weight,
            price_per_piece: record.price_per_piece,
            barcode: record.barcode,
            created_at,
        }
    }
}
