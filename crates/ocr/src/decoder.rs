use image::DynamicImage;
use shelftag_core::RawBarcode;

use crate::recognizer::OcrError;

/// Abstraction over a barcode engine. `Ok(None)` means the image holds no
/// decodable barcode, which is not an error.
pub trait BarcodeDecoder: Send + Sync {
    fn decode(&self, image: &DynamicImage) -> Result<Option<RawBarcode>, OcrError>;
}

impl<T: BarcodeDecoder + ?Sized> BarcodeDecoder for Box<T> {
    fn decode(&self, image: &DynamicImage) -> Result<Option<RawBarcode>, OcrError> {
        (**self).decode(image)
    }
}

/// Returns a pre-set payload regardless of the image.
pub struct MockBarcodeDecoder {
    pub payload: Option<RawBarcode>,
}

impl MockBarcodeDecoder {
    pub fn new(payload: impl Into<RawBarcode>) -> Self {
        Self { payload: Some(payload.into()) }
    }

    pub fn empty() -> Self {
        Self { payload: None }
    }
}

impl BarcodeDecoder for MockBarcodeDecoder {
    fn decode(&self, _image: &DynamicImage) -> Result<Option<RawBarcode>, OcrError> {
        Ok(self.payload.clone())
    }
}

/// Used when no barcode engine is compiled in; every scan reports no barcode.
pub struct NullBarcodeDecoder;

impl BarcodeDecoder for NullBarcodeDecoder {
    fn decode(&self, _image: &DynamicImage) -> Result<Option<RawBarcode>, OcrError> {
        Ok(None)
    }
}

// ── ZXing backend (optional, gated behind `zxing` feature) ────────────────────

#[cfg(feature = "zxing")]
pub mod zxing_backend {
    use super::{BarcodeDecoder, OcrError};
    use image::DynamicImage;
    use shelftag_core::RawBarcode;

    pub struct ZxingDecoder;

    impl BarcodeDecoder for ZxingDecoder {
        fn decode(&self, image: &DynamicImage) -> Result<Option<RawBarcode>, OcrError> {
            let luma = image.to_luma8();
            let (width, height) = luma.dimensions();
            match rxing::helpers::detect_in_luma(luma.into_raw(), width, height, None) {
                Ok(result) => Ok(Some(RawBarcode::Text(result.getText().to_string()))),
                Err(rxing::Exceptions::NotFoundException(_)) => Ok(None),
                Err(e) => Err(OcrError::Barcode(e.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageBuffer, Luma};

    fn blank() -> DynamicImage {
        let img: GrayImage = ImageBuffer::from_fn(2, 2, |_, _| Luma([255u8]));
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn mock_returns_payload() {
        let d = MockBarcodeDecoder::new("3850-1234");
        assert_eq!(d.decode(&blank()).unwrap(), Some(RawBarcode::Text("3850-1234".into())));
        assert_eq!(MockBarcodeDecoder::empty().decode(&blank()).unwrap(), None);
    }

    #[test]
    fn null_decoder_finds_nothing() {
        let d: Box<dyn BarcodeDecoder> = Box::new(NullBarcodeDecoder);
        assert_eq!(d.decode(&blank()).unwrap(), None);
    }
}
