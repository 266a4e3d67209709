//! OCR backend plugin trait.
//!
//! The OCR stage only talks to this trait, so the recognition engine can be
//! swapped (or mocked in tests) without touching the pipeline.

use crate::Result;
use crate::core::config::OcrConfig;
use crate::plugins::Plugin;
use crate::types::NormalizedImage;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrBackendType {
    Tesseract,
    Custom,
}

/// Recognizes text in a single PNG image.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use docsift::core::config::OcrConfig;
/// use docsift::plugins::{OcrBackend, OcrBackendType, Plugin};
/// use docsift::{NormalizedImage, Result};
///
/// struct Constant;
///
/// impl Plugin for Constant {
///     fn name(&self) -> &str { "constant" }
///     fn version(&self) -> String { "1.0.0".to_string() }
/// }
///
/// #[async_trait]
/// impl OcrBackend for Constant {
///     async fn process_image(&self, _image: &NormalizedImage, _config: &OcrConfig) -> Result<String> {
///         Ok("TEXT".to_string())
///     }
///
///     fn supports_language(&self, _lang: &str) -> bool { true }
///
///     fn backend_type(&self) -> OcrBackendType { OcrBackendType::Custom }
/// }
/// ```
#[async_trait]
pub trait OcrBackend: Plugin {
    /// Run recognition on one image and return the recognized text.
    ///
    /// # Errors
    ///
    /// Failures must be reported as `DocsiftError::Ocr` (or
    /// `MissingDependency` when the engine is not installed).
    async fn process_image(&self, image: &NormalizedImage, config: &OcrConfig) -> Result<String>;

    fn supports_language(&self, lang: &str) -> bool;

    fn backend_type(&self) -> OcrBackendType;
}
