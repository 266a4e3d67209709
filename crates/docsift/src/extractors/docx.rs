//! DOCX document extractor.
//!
//! Supports: Microsoft Word (.docx)

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::extraction::docx;
use crate::plugins::{DocumentExtractor, Plugin};
use crate::types::{ExtractedTable, FileType, NormalizedImage};

/// DOCX extractor reading the OOXML package directly with `zip` and `roxmltree`.
pub struct DocxExtractor;

impl DocxExtractor {
    /// Create a new DOCX extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Default for DocxExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for DocxExtractor {
    fn name(&self) -> &str {
        "docx-extractor"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }
}

impl DocumentExtractor for DocxExtractor {
    fn file_type(&self) -> FileType {
        FileType::Docx
    }

    fn extract_text(&self, content: &[u8]) -> Result<String> {
        docx::extract_text(content)
    }

    fn extract_images(&self, content: &[u8]) -> Result<Vec<NormalizedImage>> {
        docx::extract_images(content)
    }

    /// DOCX tables ignore the table detection settings; the structure is explicit.
    fn extract_tables(&self, content: &[u8], _config: &ExtractionConfig) -> Result<Vec<ExtractedTable>> {
        docx::extract_tables(content)
    }
}
