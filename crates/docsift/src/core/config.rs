//! Configuration loading and management.
//!
//! Extraction settings can be loaded from TOML, YAML, or JSON files, discovered
//! from a `docsift.toml` in the current or any parent directory, or built in code.

use crate::ocr::validation::{validate_language_code, validate_psm};
use crate::{DocsiftError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main extraction configuration.
///
/// # Example
///
/// ```rust
/// use docsift::core::config::ExtractionConfig;
///
/// let config = ExtractionConfig::default();
/// assert_eq!(config.ocr.language, "eng");
/// assert_eq!(config.timeout_secs, Some(300));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// OCR settings for embedded images
    #[serde(default)]
    pub ocr: OcrConfig,

    /// PDF table detection tolerances
    #[serde(default)]
    pub tables: TableConfig,

    /// Per-request deadline in seconds (None = no deadline)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
}

/// OCR configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Language code (e.g., "eng", "deu", "eng+fra")
    #[serde(default = "default_eng")]
    pub language: String,

    /// Tesseract page segmentation mode (0-13)
    #[serde(default = "default_psm")]
    pub psm: u8,

    /// Tesseract executable name or path
    #[serde(default = "default_tesseract_cmd")]
    pub tesseract_cmd: String,
}

/// Tolerances used by the ruling-line table detector, in PDF user-space units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Parallel lines closer than this are snapped onto one coordinate.
    #[serde(default = "default_tolerance")]
    pub snap_tolerance: f32,

    /// Collinear segments with gaps up to this size are joined.
    #[serde(default = "default_tolerance")]
    pub join_tolerance: f32,

    /// Slack allowed when testing whether two lines cross.
    #[serde(default = "default_tolerance")]
    pub intersection_tolerance: f32,

    /// Segments shorter than this are ignored.
    #[serde(default = "default_min_edge_length")]
    pub min_edge_length: f32,
}

fn default_eng() -> String {
    "eng".to_string()
}
fn default_psm() -> u8 {
    3
}
fn default_tesseract_cmd() -> String {
    "tesseract".to_string()
}
fn default_tolerance() -> f32 {
    3.0
}
fn default_min_edge_length() -> f32 {
    3.0
}
fn default_timeout_secs() -> Option<u64> {
    Some(300)
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            ocr: OcrConfig::default(),
            tables: TableConfig::default(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: default_eng(),
            psm: default_psm(),
            tesseract_cmd: default_tesseract_cmd(),
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            snap_tolerance: default_tolerance(),
            join_tolerance: default_tolerance(),
            intersection_tolerance: default_tolerance(),
            min_edge_length: default_min_edge_length(),
        }
    }
}

impl ExtractionConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `DocsiftError::Validation` if the file cannot be read, is not valid
    /// TOML, or holds out-of-range values.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| DocsiftError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| DocsiftError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;

        let config: Self = serde_json::from_str(&content)
            .map_err(|e| DocsiftError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, choosing the parser from the file extension.
    ///
    /// `.toml`, `.yaml`/`.yml` and `.json` are recognized.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(DocsiftError::validation(format!(
                "Unsupported config file format: {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover configuration file in parent directories.
    ///
    /// Searches for `docsift.toml` in the current directory and its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(DocsiftError::Io)?;

        loop {
            let docsift_toml = current.join("docsift.toml");
            if docsift_toml.exists() {
                tracing::debug!("Found config file at {}", docsift_toml.display());
                return Ok(Some(Self::from_toml_file(docsift_toml)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        validate_language_code(&self.ocr.language)
            .map_err(|e| DocsiftError::validation_with_source(format!("ocr.language: {}", e), e))?;
        validate_psm(self.ocr.psm).map_err(|e| DocsiftError::validation_with_source(format!("ocr.psm: {}", e), e))?;
        if self.ocr.tesseract_cmd.trim().is_empty() {
            return Err(DocsiftError::validation("ocr.tesseract_cmd must not be empty"));
        }
        if self.timeout_secs == Some(0) {
            return Err(DocsiftError::validation("timeout_secs must be greater than zero"));
        }

        let tolerances = [
            ("tables.snap_tolerance", self.tables.snap_tolerance),
            ("tables.join_tolerance", self.tables.join_tolerance),
            ("tables.intersection_tolerance", self.tables.intersection_tolerance),
            ("tables.min_edge_length", self.tables.min_edge_length),
        ];
        for (name, value) in tolerances {
            if !value.is_finite() || value < 0.0 {
                return Err(DocsiftError::validation(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| DocsiftError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
