//! PDF document extractor.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::pdf;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedTable, FileType, NormalizedImage};

/// PDF extractor backed by `lopdf`.
///
/// Text comes from the page content streams, images from page image
/// XObjects, and tables from ruling-line detection.
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PdfExtractor {
    fn name(&self) -> &str {
        "pdf-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

impl DocumentExtractor for PdfExtractor {
    fn file_type(&self) -> FileType {
        FileType::Pdf
    }

    fn extract_text(&self, content: &[u8]) -> Result<String> {
        Ok(pdf::extract_text_from_pdf(content)?)
    }

    fn extract_images(&self, content: &[u8]) -> Result<Vec<NormalizedImage>> {
        Ok(pdf::extract_images_from_pdf(content)?)
    }

    fn extract_tables(&self, content: &[u8], config: &ExtractionConfig) -> Result<Vec<ExtractedTable>> {
        Ok(pdf::extract_tables_from_pdf(content, &config.tables)?)
    }
}
