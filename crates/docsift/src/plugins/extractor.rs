//! Document extractor trait.
//!
//! One implementation exists per supported container format. Each method takes
//! the raw document bytes and opens its own view of the document, so the three
//! stages can run on separate blocking threads without sharing a parser handle.

use crate::Result;
use crate::core::config::ExtractionConfig;
use crate::plugins::Plugin;
use crate::types::{ExtractedTable, FileType, NormalizedImage};

/// Format-specific extraction stages.
///
/// All methods are synchronous and CPU-bound; callers run them inside
/// `tokio::task::spawn_blocking`.
///
/// # Errors
///
/// Bytes that cannot be opened as the extractor's format must produce
/// `DocsiftError::CorruptDocument`. Failures after the document was opened
/// produce `DocsiftError::Extraction`.
pub trait DocumentExtractor: Plugin {
    /// The format handled by this extractor.
    fn file_type(&self) -> FileType;

    /// Embedded selectable text, newline-joined in document order.
    fn extract_text(&self, content: &[u8]) -> Result<String>;

    /// Embedded raster images in document order, each re-encoded as PNG.
    fn extract_images(&self, content: &[u8]) -> Result<Vec<NormalizedImage>>;

    /// Tables normalized into row records.
    fn extract_tables(&self, content: &[u8], config: &ExtractionConfig) -> Result<Vec<ExtractedTable>>;
}
