//! Image normalization.
//!
//! Every embedded image, whatever its original encoding, is handed to OCR as
//! PNG. This module owns the decode and re-encode step.

use crate::error::{DocsiftError, Result};
use crate::types::NormalizedImage;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;

/// Decode image bytes of any supported encoding and re-encode them as PNG.
///
/// # Errors
///
/// Returns `DocsiftError::Extraction` if the format cannot be recognized or the
/// image cannot be decoded.
pub fn normalize_image_bytes(bytes: &[u8]) -> Result<NormalizedImage> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DocsiftError::extraction_with_source("Failed to read image format", e))?;

    if reader.format().is_none() {
        return Err(DocsiftError::extraction("Could not determine image format"));
    }

    let image = reader
        .decode()
        .map_err(|e| DocsiftError::extraction_with_source(format!("Failed to decode image: {}", e), e))?;

    encode_png(&image)
}

/// Encode an already decoded image as PNG.
pub fn encode_png(image: &DynamicImage) -> Result<NormalizedImage> {
    let mut data = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut data), ImageFormat::Png)
        .map_err(|e| DocsiftError::extraction_with_source(format!("PNG encoding failed: {}", e), e))?;

    Ok(NormalizedImage {
        data,
        width: image.width(),
        height: image.height(),
    })
}
