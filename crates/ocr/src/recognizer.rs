use thiserror::Error;

/// Failures from either engine behind a label scan.
#[derive(Debug, Error)]
pub enum OcrError {
    #[error("Label image rejected by the OCR engine: {0}")]
    ImageDecode(String),
    #[error("Text recognition failed: {0}")]
    Engine(String),
    #[error("Barcode engine error: {0}")]
    Barcode(String),
    #[error("{0} engine not available, rebuild with the `{1}` feature")]
    NotAvailable(&'static str, &'static str),
}

/// Reads the printed text off a shelf label.
///
/// Gets the encoded image exactly as read from disk. The returned text keeps
/// the label's layout: one printed line per text line, top to bottom, so the
/// parser can tell the product name apart from the weight and price lines.
pub trait OcrBackend: Send + Sync {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError>;
}

impl<T: OcrBackend + ?Sized> OcrBackend for Box<T> {
    fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
        (**self).recognize(image_bytes)
    }
}

// ── Scripted label text ──────────────────────────────────────────────────────

/// Hands back a fixed label transcript (e.g. `"Organic Oats\n180g\n1,99 €"`)
/// whatever image it is given. Drives scan sessions without libtesseract.
pub struct MockRecognizer {
    pub text: String,
}

impl MockRecognizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrBackend for MockRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Ok(self.text.clone())
    }
}

/// Stand-in used when the binary was built without an OCR engine.
pub struct UnavailableRecognizer;

impl OcrBackend for UnavailableRecognizer {
    fn recognize(&self, _image_bytes: &[u8]) -> Result<String, OcrError> {
        Err(OcrError::NotAvailable("Tesseract", "tesseract"))
    }
}

// ── Tesseract (`tesseract` feature) ──────────────────────────────────────────

#[cfg(feature = "tesseract")]
pub mod tesseract_backend {
    use super::{OcrBackend, OcrError};
    use leptess::LepTess;

    /// Runs libtesseract on each label. `lang` is a traineddata name such as
    /// `"eng"` or `"hrv"`; `data_path` overrides `TESSDATA_PREFIX`.
    pub struct TesseractRecognizer {
        data_path: Option<String>,
        lang: String,
    }

    impl TesseractRecognizer {
        pub fn new(data_path: Option<String>, lang: &str) -> Self {
            Self { data_path, lang: lang.to_string() }
        }
    }

    impl OcrBackend for TesseractRecognizer {
        fn recognize(&self, image_bytes: &[u8]) -> Result<String, OcrError> {
            let mut engine = LepTess::new(self.data_path.as_deref(), &self.lang)
                .map_err(|e| OcrError::Engine(format!("{} traineddata: {e}", self.lang)))?;
            engine
                .set_image_from_mem(image_bytes)
                .map_err(|e| OcrError::ImageDecode(e.to_string()))?;
            let text = engine.get_utf8_text().map_err(|e| OcrError::Engine(e.to_string()))?;
            tracing::debug!(lang = %self.lang, chars = text.len(), "tesseract pass finished");
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scripted_transcript_ignores_image() {
        let r = MockRecognizer::new("Organic Oats\n180g\n1,99 €");
        assert_eq!(r.recognize(b"\x89PNG").unwrap(), "Organic Oats\n180g\n1,99 €");
        assert_eq!(r.recognize(b"").unwrap(), r.text);
    }

    #[test]
    fn boxed_backend_delegates() {
        let r: Box<dyn OcrBackend> = Box::new(MockRecognizer::new("Fresh Milk\n1l"));
        assert_eq!(r.recognize(b"").unwrap(), "Fresh Milk\n1l");
    }

    #[test]
    fn unavailable_names_the_feature() {
        let err = UnavailableRecognizer.recognize(b"").unwrap_err();
        assert!(matches!(err, OcrError::NotAvailable(_, "tesseract")));
        assert!(err.to_string().contains("`tesseract` feature"));
    }
}
