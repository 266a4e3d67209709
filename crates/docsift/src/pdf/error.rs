use std::fmt;

#[derive(Debug, Clone)]
pub enum PdfError {
    InvalidPdf(String),
    TextExtractionFailed(String),
    ImageExtractionFailed(String),
    ContentStreamFailed(String),
    TableExtractionFailed(String),
}

impl fmt::Display for PdfError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfError::InvalidPdf(msg) => write!(f, "Invalid PDF: {}", msg),
            PdfError::TextExtractionFailed(msg) => write!(f, "Text extraction failed: {}", msg),
            PdfError::ImageExtractionFailed(msg) => write!(f, "Image extraction failed: {}", msg),
            PdfError::ContentStreamFailed(msg) => write!(f, "Content stream parsing failed: {}", msg),
            PdfError::TableExtractionFailed(msg) => write!(f, "Table extraction failed: {}", msg),
        }
    }
}

impl std::error::Error for PdfError {}

// NOTE: No From<std::io::Error> impl - IO errors must bubble up unchanged per error handling policy

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        PdfError::InvalidPdf(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pdf_error() {
        let err = PdfError::InvalidPdf("corrupted header".to_string());
        assert_eq!(err.to_string(), "Invalid PDF: corrupted header");
    }

    #[test]
    fn test_text_extraction_failed_error() {
        let err = PdfError::TextExtractionFailed("page 2: missing font".to_string());
        assert_eq!(err.to_string(), "Text extraction failed: page 2: missing font");
    }

    #[test]
    fn test_image_extraction_failed_error() {
        let err = PdfError::ImageExtractionFailed("unsupported filter JBIG2Decode".to_string());
        assert_eq!(
            err.to_string(),
            "Image extraction failed: unsupported filter JBIG2Decode"
        );
    }

    #[test]
    fn test_content_stream_failed_error() {
        let err = PdfError::ContentStreamFailed("unexpected token".to_string());
        assert_eq!(err.to_string(), "Content stream parsing failed: unexpected token");
    }

    #[test]
    fn test_table_extraction_failed_error() {
        let err = PdfError::TableExtractionFailed("page 1".to_string());
        assert_eq!(err.to_string(), "Table extraction failed: page 1");
    }

    #[test]
    fn test_error_is_std_error() {
        let err = PdfError::InvalidPdf("x".to_string());
        let _: &dyn std::error::Error = &err;
    }
}
