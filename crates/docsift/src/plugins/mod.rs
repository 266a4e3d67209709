//! Plugin traits for document extractors and OCR backends.
//!
//! - [`Plugin`] - base trait with lifecycle hooks and metadata
//! - [`DocumentExtractor`] - per-format text, image and table stages
//! - [`OcrBackend`] - text recognition over normalized images
//!
//! Extractors are selected statically by [`crate::extractors::extractor_for`];
//! OCR backends are passed to the pipeline as `Arc<dyn OcrBackend>`.

mod extractor;
mod ocr;
mod traits;

pub use extractor::DocumentExtractor;
pub use ocr::{OcrBackend, OcrBackendType};
pub use traits::Plugin;
