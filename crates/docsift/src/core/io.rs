//! File I/O utilities.

use crate::{DocsiftError, Result};
use std::path::Path;
use tokio::fs;

/// Read a file asynchronously.
///
/// # Errors
///
/// Returns `DocsiftError::Io` for I/O errors (these always bubble up).
pub async fn read_file_async(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    fs::read(path.as_ref()).await.map_err(DocsiftError::Io)
}

/// Validate that a path exists and is a regular file.
///
/// # Errors
///
/// Returns `DocsiftError::Validation` otherwise.
pub fn validate_file_exists(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DocsiftError::validation(format!(
            "File does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}
