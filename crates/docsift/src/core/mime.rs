//! Format detection for uploaded documents.
//!
//! The format is decided from the file-name suffix alone, case-insensitively.
//! Detection runs before any extractor touches the bytes, so an unsupported
//! upload never triggers parsing work.

use crate::types::FileType;
use crate::{DocsiftError, Result};
use std::path::Path;

/// Extensions accepted by the dispatcher, lower-case.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx"];

/// Map a bare extension (without the dot) to a [`FileType`].
///
/// # Errors
///
/// Returns `DocsiftError::UnsupportedFormat` carrying the lower-cased extension.
pub fn file_type_from_extension(extension: &str) -> Result<FileType> {
    let ext = extension.trim().to_ascii_lowercase();
    match ext.as_str() {
        "pdf" => Ok(FileType::Pdf),
        "docx" => Ok(FileType::Docx),
        _ => Err(DocsiftError::UnsupportedFormat(ext)),
    }
}

/// Detect the document format from an uploaded file name.
///
/// Only the part after the last `.` is considered. Names without a suffix are
/// rejected with an empty extension.
///
/// # Examples
///
/// ```rust
/// use docsift::core::mime::detect_file_type;
/// use docsift::FileType;
///
/// assert_eq!(detect_file_type("Report.PDF").unwrap(), FileType::Pdf);
/// assert!(detect_file_type("notes.txt").is_err());
/// ```
pub fn detect_file_type(file_name: &str) -> Result<FileType> {
    // Browsers may send a full client path as the file name.
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);

    match base.rsplit_once('.') {
        Some((_, ext)) => file_type_from_extension(ext),
        None => Err(DocsiftError::UnsupportedFormat(String::new())),
    }
}

/// Detect the document format of a file on disk.
pub fn detect_file_type_from_path(path: impl AsRef<Path>) -> Result<FileType> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| DocsiftError::validation(format!("Invalid file name: {}", path.display())))?;
    detect_file_type(name)
}
