//! API request and response types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::plugins::OcrBackend;
use crate::types::{ExtractedTable, ExtractionResult, FileType};
use crate::ExtractionConfig;

/// API server size limit configuration.
///
/// Default limits are 100 MB for both the whole request body and a single
/// multipart field.
///
/// # Configuration via Environment Variables
///
/// ```bash
/// # In bytes:
/// export DOCSIFT_MAX_REQUEST_BODY_BYTES=104857600     # 100 MB
/// export DOCSIFT_MAX_MULTIPART_FIELD_BYTES=104857600  # 100 MB
///
/// # In MB, applies to both limits:
/// export DOCSIFT_MAX_UPLOAD_SIZE_MB=100
/// ```
///
/// # Examples
///
/// ```
/// use docsift::api::ApiSizeLimits;
///
/// let limits = ApiSizeLimits::default();
/// assert_eq!(limits.max_request_body_bytes, 100 * 1024 * 1024);
///
/// let limits = ApiSizeLimits::from_mb(20, 10);
/// assert_eq!(limits.max_multipart_field_bytes, 10 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiSizeLimits {
    /// Maximum size of the entire request body in bytes.
    pub max_request_body_bytes: usize,

    /// Maximum size of a single multipart field in bytes.
    pub max_multipart_field_bytes: usize,
}

impl Default for ApiSizeLimits {
    fn default() -> Self {
        Self::from_mb(100, 100)
    }
}

impl ApiSizeLimits {
    pub fn new(max_request_body_bytes: usize, max_multipart_field_bytes: usize) -> Self {
        Self {
            max_request_body_bytes,
            max_multipart_field_bytes,
        }
    }

    /// Create size limits from MB values.
    pub fn from_mb(max_request_body_mb: usize, max_multipart_field_mb: usize) -> Self {
        Self {
            max_request_body_bytes: max_request_body_mb * 1024 * 1024,
            max_multipart_field_bytes: max_multipart_field_mb * 1024 * 1024,
        }
    }
}

/// Successful extraction response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    /// Always `"Extraction complete"`.
    pub message: String,
    pub file_type: FileType,
    pub extracted_text: String,
    pub ocr_text: String,
    /// Number of embedded images that were sent to OCR.
    pub extracted_images: usize,
    pub extracted_tables: Vec<ExtractedTable>,
}

impl From<ExtractionResult> for ExtractResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            message: "Extraction complete".to_string(),
            file_type: result.file_type,
            extracted_text: result.extracted_text,
            ocr_text: result.ocr_text,
            extracted_images: result.extracted_image_count,
            extracted_tables: result.extracted_tables,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// API server state.
///
/// Read-only for the lifetime of the server; requests share nothing else.
#[derive(Clone)]
pub struct ApiState {
    /// Extraction configuration applied to every request.
    pub config: Arc<ExtractionConfig>,
    pub ocr_backend: Arc<dyn OcrBackend>,
}

impl fmt::Debug for ApiState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiState")
            .field("config", &self.config)
            .field("ocr_backend", &self.ocr_backend.name())
            .finish()
    }
}
