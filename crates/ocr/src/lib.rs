pub mod decoder;
pub mod extract;
pub mod intake;
pub mod pipeline;
pub mod recognizer;

pub use decoder::{BarcodeDecoder, MockBarcodeDecoder, NullBarcodeDecoder};
pub use extract::{parse_label, LabelParser};
pub use intake::{has_supported_extension, load_label_image, ImageInputError, SUPPORTED_EXTENSIONS};
pub use pipeline::{LabelPipeline, LabelScan, PipelineError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, UnavailableRecognizer};
