pub mod barcode;
pub mod label;
pub mod profile;
pub mod record;

pub use barcode::{normalize_barcode, Barcode, RawBarcode};
pub use label::{FieldValue, ParsedLabel, Sentinel};
pub use profile::{AppConfig, ConfigError, LabelProfile, LabelStrategy, TableName};
pub use record::{NewScanRecord, RecordId, ScanRecord};
