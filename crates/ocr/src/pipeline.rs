use std::path::Path;
use thiserror::Error;

use shelftag_core::{normalize_barcode, Barcode, LabelStrategy, ParsedLabel};

use crate::decoder::BarcodeDecoder;
use crate::extract::LabelParser;
use crate::intake::{self, ImageInputError};
use crate::recognizer::{OcrBackend, OcrError};

/// Every way an image can fail to turn into a scan. None of these leave
/// anything behind.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image could not be read: {0}")]
    Image(#[from] ImageInputError),
    #[error("Recognition failed: {0}")]
    Ocr(#[from] OcrError),
}

/// The result of scanning a single label image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelScan {
    /// Raw OCR text output.
    pub ocr_text: String,
    pub label: ParsedLabel,
    pub barcode: Barcode,
}

/// Orchestrates: read → decode → OCR → barcode → parse.
///
/// Engines are handed in by the caller so the pipeline can run against mocks.
pub struct LabelPipeline<R: OcrBackend, B: BarcodeDecoder> {
    recognizer: R,
    decoder: B,
    parser: LabelParser,
}

impl<R: OcrBackend, B: BarcodeDecoder> LabelPipeline<R, B> {
    pub fn new(recognizer: R, decoder: B, strategy: &LabelStrategy) -> Self {
        Self { recognizer, decoder, parser: LabelParser::new(strategy) }
    }

    /// Process a file on disk.
    pub async fn process_file(&self, path: &Path) -> Result<LabelScan, PipelineError> {
        let bytes = tokio::fs::read(path).await?;
        tracing::info!("Scanning label image: {}", path.display());
        self.process_bytes(&bytes)
    }

    /// Process raw encoded image bytes.
    pub fn process_bytes(&self, data: &[u8]) -> Result<LabelScan, PipelineError> {
        // 1. Reject anything that is not a decodable PNG/JPEG/BMP up front.
        let image = intake::load_label_image(data)?;

        // 2. Run OCR on the encoded bytes.
        let ocr_text = self.recognizer.recognize(data)?;
        tracing::debug!(%ocr_text, "complete OCR text");

        // 3. Look for a barcode.
        let raw_barcode = self.decoder.decode(&image)?;

        // 4. Structure both.
        let label = self.parser.parse(&ocr_text);
        let barcode = normalize_barcode(raw_barcode);
        tracing::info!(barcode = %barcode, "label scanned");

        Ok(LabelScan { ocr_text, label, barcode })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::MockBarcodeDecoder;
    use crate::recognizer::{MockRecognizer, UnavailableRecognizer};
    use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
    use shelftag_core::{FieldValue, Sentinel};
    use std::io::Cursor;

    fn tiny_png() -> Vec<u8> {
        let img: GrayImage = ImageBuffer::from_fn(4, 4, |_, _| Luma([200u8]));
        let mut buf = Vec::new();
        DynamicImage::ImageLuma8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn process_bytes_parses_and_normalizes() {
        let pipeline = LabelPipeline::new(
            MockRecognizer::new("Organic Oats\n180g\n1,99 €"),
            MockBarcodeDecoder::new(&b"4056-4895-0123 "[..]),
            &LabelStrategy::generic(),
        );

        let scan = pipeline.process_bytes(&tiny_png()).unwrap();

        assert_eq!(scan.label.product_name.as_str(), "Organic Oats");
        assert_eq!(scan.label.weight.as_str(), "180g");
        assert_eq!(scan.label.price_per_unit.as_str(), "1.99 €");
        assert_eq!(scan.barcode, Barcode::Digits("405648950123".into()));
        assert_eq!(scan.ocr_text, "Organic Oats\n180g\n1,99 €");
    }

    #[test]
    fn missing_barcode_degrades_to_sentinel() {
        let pipeline = LabelPipeline::new(
            MockRecognizer::new("Organic Oats\n300g\n427 €/kom"),
            MockBarcodeDecoder::empty(),
            &LabelStrategy::alphabetic(),
        );

        let scan = pipeline.process_bytes(&tiny_png()).unwrap();

        assert_eq!(scan.label.price_per_unit.as_str(), "4.27 €/kom");
        assert_eq!(scan.barcode.to_string(), "Unknown Barcode");
    }

    #[test]
    fn blank_ocr_text_is_not_an_error() {
        let pipeline = LabelPipeline::new(
            MockRecognizer::new(""),
            MockBarcodeDecoder::empty(),
            &LabelStrategy::generic(),
        );
        let scan = pipeline.process_bytes(&tiny_png()).unwrap();
        assert_eq!(scan.label.weight, FieldValue::Unknown(Sentinel::UnknownWeight));
    }

    #[test]
    fn corrupt_image_is_rejected_before_ocr() {
        let pipeline = LabelPipeline::new(
            MockRecognizer::new("Organic Oats"),
            MockBarcodeDecoder::empty(),
            &LabelStrategy::generic(),
        );
        let err = pipeline.process_bytes(b"not an image").unwrap_err();
        assert!(matches!(err, PipelineError::Image(_)));
    }

    #[test]
    fn engine_failure_surfaces() {
        let pipeline = LabelPipeline::new(
            UnavailableRecognizer,
            MockBarcodeDecoder::empty(),
            &LabelStrategy::generic(),
        );
        let err = pipeline.process_bytes(&tiny_png()).unwrap_err();
        assert!(matches!(err, PipelineError::Ocr(OcrError::NotAvailable(..))));
    }

    #[tokio::test]
    async fn process_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("label.png");
        std::fs::write(&path, tiny_png()).unwrap();

        let pipeline = LabelPipeline::new(
            MockRecognizer::new("Organic Oats\n180g\n1,99 €"),
            MockBarcodeDecoder::new("811-234-567"),
            &LabelStrategy::generic(),
        );
        let scan = pipeline.process_file(&path).await.unwrap();
        assert_eq!(scan.barcode.as_str(), "811234567");
    }

    #[tokio::test]
    async fn process_file_missing_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = LabelPipeline::new(
            MockRecognizer::new(""),
            MockBarcodeDecoder::empty(),
            &LabelStrategy::generic(),
        );
        let err = pipeline
            .process_file(&dir.path().join("nope.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Io(_)));
    }
}
