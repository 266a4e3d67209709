//! OCR over a list of normalized images.

use crate::Result;
use crate::core::config::OcrConfig;
use crate::plugins::OcrBackend;
use crate::types::NormalizedImage;

/// Remove control characters other than newline, carriage return and tab.
///
/// Tesseract ends each page with a form feed, which is noise in a JSON string.
pub(crate) fn strip_control_characters(text: &str) -> String {
    if text
        .chars()
        .any(|c| matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}') && c != '\n' && c != '\r' && c != '\t')
    {
        text.chars()
            .filter(|c| !matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}') || matches!(c, '\n' | '\r' | '\t'))
            .collect()
    } else {
        text.to_string()
    }
}

/// Recognize every image in order and concatenate the results.
///
/// Each image contributes its recognized text followed by `\n`. An empty image
/// list yields an empty string without touching the backend. The first
/// failing image aborts the whole run.
pub async fn run_ocr(images: &[NormalizedImage], backend: &dyn OcrBackend, config: &OcrConfig) -> Result<String> {
    let mut text = String::new();

    for (index, image) in images.iter().enumerate() {
        let recognized = backend.process_image(image, config).await?;
        tracing::debug!(
            backend = backend.name(),
            image = index,
            chars = recognized.len(),
            "OCR completed for image"
        );
        text.push_str(&strip_control_characters(&recognized));
        text.push('\n');
    }

    Ok(text)
}
