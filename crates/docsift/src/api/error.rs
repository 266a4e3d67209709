//! Mapping from library errors to HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::DocsiftError;

use super::types::ErrorResponse;

/// Message returned for uploads that are neither PDF nor DOCX.
pub const UNSUPPORTED_FILE_MESSAGE: &str = "Unsupported file type. Please upload a PDF or DOCX.";

/// An error ready to be sent to the client as `{ "error": ... }`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse { error: message.into() },
        }
    }

    /// 400 for a malformed request.
    pub fn validation(error: DocsiftError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error.to_string())
    }

    /// 500 for a server-side failure.
    pub fn internal(error: DocsiftError) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl From<DocsiftError> for ApiError {
    fn from(error: DocsiftError) -> Self {
        match &error {
            DocsiftError::NoFileProvided => Self::validation(error),
            DocsiftError::UnsupportedFormat(ext) => {
                tracing::debug!(extension = %ext, "Rejected unsupported upload");
                Self::new(StatusCode::BAD_REQUEST, UNSUPPORTED_FILE_MESSAGE)
            }
            DocsiftError::Validation { .. } => Self::validation(error),
            DocsiftError::CorruptDocument { .. } => Self::new(StatusCode::UNPROCESSABLE_ENTITY, error.to_string()),
            DocsiftError::Timeout(_) => Self::new(StatusCode::GATEWAY_TIMEOUT, error.to_string()),
            _ => {
                tracing::error!(error = %error, "Extraction failed");
                Self::internal(error)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
