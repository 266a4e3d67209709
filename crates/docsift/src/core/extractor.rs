//! Main extraction entry points.
//!
//! The pipeline is: detect the format from the file name, then run three
//! branches concurrently (text, images followed by OCR, tables), then
//! aggregate. Every branch parses the document on its own blocking thread.
//! The first failing branch aborts the request and the others are dropped.
//!
//! # Functions
//!
//! - [`extract_bytes`] - Extract from an uploaded byte payload and its file name
//! - [`extract_bytes_with_backend`] - Same, with an explicit OCR backend
//! - [`extract_file`] - Extract from a local file path

use crate::core::config::ExtractionConfig;
use crate::core::mime::{detect_file_type, detect_file_type_from_path};
use crate::core::pipeline::aggregate;
use crate::extractors::extractor_for;
use crate::ocr::{TesseractBackend, run_ocr};
use crate::plugins::{OcrBackend, Plugin};
use crate::types::{ExtractionResult, FileType};
use crate::{DocsiftError, Result};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// The OCR backend used when none is supplied.
pub fn default_ocr_backend() -> Arc<dyn OcrBackend> {
    Arc::new(TesseractBackend::new())
}

async fn blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task).await?
}

async fn run_pipeline(
    file_type: FileType,
    content: Arc<[u8]>,
    config: Arc<ExtractionConfig>,
    backend: Arc<dyn OcrBackend>,
) -> Result<ExtractionResult> {
    let extractor = extractor_for(file_type);
    tracing::debug!(extractor = extractor.name(), format = %extractor.file_type(), "Dispatching document");

    let text_branch = {
        let content = Arc::clone(&content);
        async move {
            let text = blocking(move || extractor.extract_text(&content)).await?;
            tracing::debug!(chars = text.len(), "Text extraction finished");
            Ok::<_, DocsiftError>(text)
        }
    };

    let ocr_branch = {
        let content = Arc::clone(&content);
        let config = Arc::clone(&config);
        async move {
            let images = blocking(move || extractor.extract_images(&content)).await?;
            tracing::debug!(images = images.len(), "Image extraction finished");
            let ocr_text = run_ocr(&images, backend.as_ref(), &config.ocr).await?;
            Ok::<_, DocsiftError>((images.len(), ocr_text))
        }
    };

    let table_branch = {
        let config = Arc::clone(&config);
        async move {
            let tables = blocking(move || extractor.extract_tables(&content, &config)).await?;
            tracing::debug!(tables = tables.len(), "Table extraction finished");
            Ok::<_, DocsiftError>(tables)
        }
    };

    let (text, (image_count, ocr_text), tables) = tokio::try_join!(text_branch, ocr_branch, table_branch)?;
    Ok(aggregate(file_type, text, ocr_text, image_count, tables))
}

/// Extract text, OCR text and tables from an uploaded document.
///
/// `file_name` is the client-supplied name; only its suffix is used, to pick
/// the format. OCR runs through the default Tesseract backend.
///
/// # Errors
///
/// - `UnsupportedFormat` when the suffix is not `pdf` or `docx`; nothing is parsed.
/// - `CorruptDocument` when the bytes do not open as the declared format.
/// - `Extraction` / `Ocr` / `MissingDependency` from the individual stages.
/// - `Timeout` when `config.timeout_secs` elapses first.
///
/// # Example
///
/// ```rust,no_run
/// use docsift::{ExtractionConfig, extract_bytes};
///
/// # async fn example() -> docsift::Result<()> {
/// let bytes = std::fs::read("invoice.pdf")?;
/// let result = extract_bytes(&bytes, "invoice.pdf", &ExtractionConfig::default()).await?;
/// println!("{} tables", result.extracted_tables.len());
/// # Ok(())
/// # }
/// ```
pub async fn extract_bytes(content: &[u8], file_name: &str, config: &ExtractionConfig) -> Result<ExtractionResult> {
    extract_bytes_with_backend(content, file_name, config, default_ocr_backend()).await
}

/// Extract from an uploaded document using the given OCR backend.
#[tracing::instrument(
    skip(content, config, backend),
    fields(
        extraction.file_name = file_name,
        extraction.size_bytes = content.len(),
        ocr.backend = backend.name(),
    )
)]
pub async fn extract_bytes_with_backend(
    content: &[u8],
    file_name: &str,
    config: &ExtractionConfig,
    backend: Arc<dyn OcrBackend>,
) -> Result<ExtractionResult> {
    let file_type = detect_file_type(file_name)?;
    tracing::debug!(file_type = %file_type, "Detected document format");

    let pipeline = run_pipeline(file_type, Arc::from(content), Arc::new(config.clone()), backend);

    let result = match config.timeout_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), pipeline)
            .await
            .map_err(|_| DocsiftError::Timeout(secs))??,
        None => pipeline.await?,
    };

    tracing::debug!(
        images = result.extracted_image_count,
        tables = result.extracted_tables.len(),
        "Extraction complete"
    );
    Ok(result)
}

/// Extract from a local file, using its file name for format detection.
pub async fn extract_file(
    path: impl AsRef<Path>,
    config: &ExtractionConfig,
    backend: Arc<dyn OcrBackend>,
) -> Result<ExtractionResult> {
    use crate::core::io;

    let path = path.as_ref();
    io::validate_file_exists(path)?;

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    // Reject unsupported suffixes before reading the file.
    detect_file_type_from_path(path)?;

    let content = io::read_file_async(path).await?;
    extract_bytes_with_backend(&content, &file_name, config, backend).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::OcrConfig;
    use crate::plugins::{OcrBackendType, Plugin};
    use crate::types::NormalizedImage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl Plugin for CountingBackend {
        fn name(&self) -> &str {
            "counting"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }
    }

    #[async_trait]
    impl OcrBackend for CountingBackend {
        async fn process_image(&self, _image: &NormalizedImage, _config: &OcrConfig) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(String::new())
        }

        fn supports_language(&self, _lang: &str) -> bool {
            true
        }

        fn backend_type(&self) -> OcrBackendType {
            OcrBackendType::Custom
        }
    }

    #[tokio::test]
    async fn test_unsupported_extension_does_no_work() {
        let backend = Arc::new(CountingBackend::default());
        let err = extract_bytes_with_backend(b"hello", "notes.txt", &ExtractionConfig::default(), backend.clone())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsiftError::UnsupportedFormat(ref ext) if ext == "txt"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_corrupt_pdf_fails_whole_request() {
        let backend = Arc::new(CountingBackend::default());
        let err = extract_bytes_with_backend(b"garbage", "scan.pdf", &ExtractionConfig::default(), backend)
            .await
            .unwrap_err();
        assert!(matches!(err, DocsiftError::CorruptDocument { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_corrupt_docx_fails_whole_request() {
        let backend = Arc::new(CountingBackend::default());
        let err = extract_bytes_with_backend(b"garbage", "letter.docx", &ExtractionConfig::default(), backend)
            .await
            .unwrap_err();
        assert!(matches!(err, DocsiftError::CorruptDocument { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn test_extract_file_missing_path() {
        let err = extract_file("/nonexistent/doc.pdf", &ExtractionConfig::default(), default_ocr_backend())
            .await
            .unwrap_err();
        assert!(matches!(err, DocsiftError::Validation { .. }));
    }
}
