//! API request handlers.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};

use crate::{DocsiftError, extract_bytes_with_backend};

use super::{
    error::ApiError,
    types::{ApiState, ExtractResponse},
};

/// Name of the multipart field carrying the document.
pub const FILE_FIELD: &str = "file";

/// Extract endpoint handler.
///
/// POST /extract
///
/// Accepts multipart form data with a `file` field holding a PDF or DOCX. The
/// format is chosen from the field's file name. Other fields, and a `file`
/// part sent without a file name, are ignored; a request that is not
/// multipart at all is treated as carrying no file.
///
/// Request body size limits are enforced at the router layer; oversized
/// uploads are rejected with HTTP 413 before reaching this handler.
pub async fn extract_handler(
    State(state): State<ApiState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let Ok(mut multipart) = multipart else {
        return Err(DocsiftError::NoFileProvided.into());
    };

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(DocsiftError::validation(e.to_string())))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        // A plain form value named `file` is not an upload.
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(DocsiftError::validation(e.to_string())))?;
        upload = Some((file_name, data));
        break;
    }

    let (file_name, data) = upload.ok_or(DocsiftError::NoFileProvided)?;
    tracing::info!(file_name = %file_name, size_bytes = data.len(), "Received document");

    let result = extract_bytes_with_backend(&data, &file_name, &state.config, state.ocr_backend.clone())
        .await
        .inspect_err(|e| {
            if e.is_client_error() {
                tracing::warn!(file_name = %file_name, error = %e, "Rejected document");
            }
        })?;
    Ok(Json(result.into()))
}
