use image::{DynamicImage, ImageFormat};
use std::path::Path;
use thiserror::Error;

/// File extensions offered by the image picker.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

#[derive(Debug, Error)]
pub enum ImageInputError {
    #[error("Unsupported image format: {0}")]
    Unsupported(String),
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
}

pub fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.iter().any(|s| e.eq_ignore_ascii_case(s)))
        .unwrap_or(false)
}

/// Sniff the format from the bytes themselves and decode. Only PNG, JPEG
/// and BMP are accepted whatever the file is called.
pub fn load_label_image(data: &[u8]) -> Result<DynamicImage, ImageInputError> {
    let format = image::guess_format(data)
        .map_err(|_| ImageInputError::Unsupported("unrecognized data".to_string()))?;
    match format {
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Bmp => {
            Ok(image::load_from_memory_with_format(data, format)?)
        }
        other => Err(ImageInputError::Unsupported(format!("{other:?}"))),
    }
}
