//! Tesseract OCR backend.
//!
//! Runs the `tesseract` command-line tool once per image, feeding the PNG on
//! stdin and reading plain text from stdout.

use crate::Result;
use crate::core::config::OcrConfig;
use crate::ocr::error::OcrError;
use crate::ocr::validation::{validate_language_code, validate_psm};
use crate::plugins::{OcrBackend, OcrBackendType, Plugin};
use crate::types::NormalizedImage;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Tesseract backend driving the external `tesseract` executable.
///
/// The executable is looked up per call from `OcrConfig::tesseract_cmd`, so a
/// single backend instance serves any configuration.
pub struct TesseractBackend {
    default_cmd: String,
}

impl TesseractBackend {
    pub fn new() -> Self {
        Self {
            default_cmd: OcrConfig::default().tesseract_cmd,
        }
    }

    /// Backend whose `initialize` check probes `cmd` instead of `tesseract`.
    pub fn with_command(cmd: impl Into<String>) -> Self {
        Self {
            default_cmd: cmd.into(),
        }
    }

    fn spawn_error(cmd: &str, err: std::io::Error) -> OcrError {
        if err.kind() == ErrorKind::NotFound {
            OcrError::TesseractNotFound(cmd.to_string())
        } else {
            OcrError::IOError(format!("failed to start {}: {}", cmd, err))
        }
    }

    async fn run(&self, image: &NormalizedImage, config: &OcrConfig) -> std::result::Result<String, OcrError> {
        validate_language_code(&config.language)?;
        validate_psm(config.psm)?;

        let cmd = config.tesseract_cmd.as_str();
        let psm = config.psm.to_string();
        let mut child = Command::new(cmd)
            .args(["stdin", "stdout", "-l", config.language.as_str(), "--psm", psm.as_str()])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::spawn_error(cmd, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| OcrError::IOError("tesseract stdin unavailable".to_string()))?;
        let data = image.data.as_slice();
        let write = async move {
            stdin.write_all(data).await?;
            stdin.shutdown().await
        };

        let (written, output) = tokio::join!(write, child.wait_with_output());
        let output = output.map_err(|e| OcrError::IOError(format!("tesseract did not complete: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        written.map_err(|e| OcrError::IOError(format!("failed to send image to tesseract: {}", e)))?;

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TesseractBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for TesseractBackend {
    fn name(&self) -> &str {
        "tesseract"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Verify the executable can be started.
    fn initialize(&self) -> Result<()> {
        std::process::Command::new(&self.default_cmd)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Self::spawn_error(&self.default_cmd, e))?;
        Ok(())
    }
}

#[async_trait]
impl OcrBackend for TesseractBackend {
    async fn process_image(&self, image: &NormalizedImage, config: &OcrConfig) -> Result<String> {
        tracing::trace!(width = image.width, height = image.height, lang = %config.language, "Running tesseract");
        Ok(self.run(image, config).await?)
    }

    fn supports_language(&self, lang: &str) -> bool {
        validate_language_code(lang).is_ok()
    }

    fn backend_type(&self) -> OcrBackendType {
        OcrBackendType::Tesseract
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocsiftError;

    fn image() -> NormalizedImage {
        NormalizedImage {
            data: b"\x89PNG\r\n\x1a\n".to_vec(),
            width: 1,
            height: 1,
        }
    }

    #[test]
    fn test_tesseract_backend_plugin_interface() {
        let backend = TesseractBackend::new();
        assert_eq!(backend.name(), "tesseract");
        assert_eq!(backend.backend_type(), OcrBackendType::Tesseract);
        assert!(backend.supports_language("eng+fra"));
        assert!(!backend.supports_language("eng fra"));
    }

    #[tokio::test]
    async fn test_missing_executable_is_missing_dependency() {
        let backend = TesseractBackend::new();
        let config = OcrConfig {
            tesseract_cmd: "docsift-no-such-tesseract-binary".to_string(),
            ..Default::default()
        };
        let err = backend.process_image(&image(), &config).await.unwrap_err();
        assert!(matches!(err, DocsiftError::MissingDependency(_)), "got {err:?}");
    }

    #[test]
    fn test_initialize_reports_missing_executable() {
        let backend = TesseractBackend::with_command("docsift-no-such-tesseract-binary");
        assert!(matches!(backend.initialize(), Err(DocsiftError::MissingDependency(_))));
    }

    #[tokio::test]
    async fn test_invalid_language_rejected_before_spawn() {
        let backend = TesseractBackend::new();
        let config = OcrConfig {
            language: "eng; rm -rf".to_string(),
            tesseract_cmd: "docsift-no-such-tesseract-binary".to_string(),
            ..Default::default()
        };
        let err = backend.process_image(&image(), &config).await.unwrap_err();
        assert!(matches!(err, DocsiftError::Ocr { .. }));
    }
}
