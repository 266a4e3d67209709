//! Error types for docsift.
//!
//! Every fallible operation in the library returns [`DocsiftError`]. The
//! pipeline is fail-fast: the first error raised by any stage aborts the whole
//! request and no partial result is produced.
//!
//! # Error kinds
//!
//! - `NoFileProvided` - the request carried no document
//! - `UnsupportedFormat` - the file extension is neither `pdf` nor `docx`
//! - `CorruptDocument` - the bytes cannot be opened as the declared format
//! - `Extraction` - a text, image or table stage failed mid-processing
//! - `Ocr` - recognition failed for one of the extracted images
//!
//! System errors (`Io`) are never wrapped; they bubble up unchanged.
//!
//! # Example
//!
//! ```rust
//! use docsift::{DocsiftError, Result};
//!
//! fn require_bytes(content: &[u8]) -> Result<&[u8]> {
//!     if content.is_empty() {
//!         return Err(DocsiftError::NoFileProvided);
//!     }
//!     Ok(content)
//! }
//! ```
use thiserror::Error;

/// Result type alias using `DocsiftError`.
pub type Result<T> = std::result::Result<T, DocsiftError>;

/// Main error type for all docsift operations.
#[derive(Debug, Error)]
pub enum DocsiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file uploaded")]
    NoFileProvided,

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt document: {message}")]
    CorruptDocument {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Extraction error: {message}")]
    Extraction {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),

    #[error("{0}")]
    Other(String),
}

impl DocsiftError {
    /// True for errors caused by the uploaded document itself rather than the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            DocsiftError::NoFileProvided | DocsiftError::UnsupportedFormat(_) | DocsiftError::CorruptDocument { .. }
        )
    }
}

impl From<serde_json::Error> for DocsiftError {
    fn from(err: serde_json::Error) -> Self {
        DocsiftError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::pdf::error::PdfError> for DocsiftError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        use crate::pdf::error::PdfError;

        let corrupt = matches!(err, PdfError::InvalidPdf(_));
        let message = err.to_string();
        if corrupt {
            DocsiftError::CorruptDocument {
                message,
                source: Some(Box::new(err)),
            }
        } else {
            DocsiftError::Extraction {
                message,
                source: Some(Box::new(err)),
            }
        }
    }
}

impl From<crate::ocr::error::OcrError> for DocsiftError {
    fn from(err: crate::ocr::error::OcrError) -> Self {
        use crate::ocr::error::OcrError;

        match err {
            OcrError::TesseractNotFound(message) => DocsiftError::MissingDependency(message),
            other => DocsiftError::Ocr {
                message: other.to_string(),
                source: Some(Box::new(other)),
            },
        }
    }
}

impl From<tokio::task::JoinError> for DocsiftError {
    fn from(err: tokio::task::JoinError) -> Self {
        DocsiftError::Other(format!("Extraction task failed: {}", err))
    }
}

macro_rules! error_constructor {
    ($name:ident, $variant:ident) => {
        pastey::paste! {
            #[doc = "Create a " $variant " error"]
            pub fn $name<S: Into<String>>(message: S) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: None,
                }
            }

            #[doc = "Create a " $variant " error with source"]
            pub fn [<$name _with_source>]<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
                message: S,
                source: E,
            ) -> Self {
                Self::$variant {
                    message: message.into(),
                    source: Some(Box::new(source)),
                }
            }
        }
    };
}

impl DocsiftError {
    error_constructor!(corrupt_document, CorruptDocument);
    error_constructor!(extraction, Extraction);
    error_constructor!(ocr, Ocr);
    error_constructor!(validation, Validation);
    error_constructor!(serialization, Serialization);
}
