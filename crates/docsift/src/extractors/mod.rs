//! Built-in document extractors.
//!
//! One extractor per supported container format, all implementing the
//! `DocumentExtractor` plugin trait. Selection is a static match on
//! [`FileType`]; the set of formats is closed.

use crate::plugins::DocumentExtractor;
use crate::types::FileType;

pub mod docx;
pub mod pdf;

pub use docx::DocxExtractor;
pub use pdf::PdfExtractor;

static PDF_EXTRACTOR: PdfExtractor = PdfExtractor;
static DOCX_EXTRACTOR: DocxExtractor = DocxExtractor;

/// The extractor responsible for `file_type`.
pub fn extractor_for(file_type: FileType) -> &'static dyn DocumentExtractor {
    match file_type {
        FileType::Pdf => &PDF_EXTRACTOR,
        FileType::Docx => &DOCX_EXTRACTOR,
    }
}
