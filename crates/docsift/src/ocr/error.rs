use std::fmt;

/// OCR-specific errors.
#[derive(Debug, Clone)]
pub enum OcrError {
    /// The configured tesseract executable could not be started.
    TesseractNotFound(String),
    InvalidConfiguration(String),
    InvalidLanguageCode(String),
    ProcessingFailed(String),
    IOError(String),
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TesseractNotFound(cmd) => {
                write!(f, "Tesseract executable '{}' not found; install tesseract-ocr or set ocr.tesseract_cmd", cmd)
            }
            Self::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Self::InvalidLanguageCode(msg) => write!(f, "Invalid language code: {}", msg),
            Self::ProcessingFailed(msg) => write!(f, "OCR processing failed: {}", msg),
            Self::IOError(msg) => write!(f, "I/O error: {}", msg),
        }
    }
}

impl std::error::Error for OcrError {}
