//! REST API server for docsift document extraction.
//!
//! An Axum-based HTTP server with a single endpoint. Every request is
//! independent; the server keeps no state beyond its configuration.
//!
//! # Endpoints
//!
//! - `POST /extract` - Extract text, OCR text and tables from an uploaded PDF or DOCX
//!   (multipart form data, field `file`)
//!
//! # Examples
//!
//! ## Starting the server
//!
//! ```no_run
//! use docsift::api::serve;
//!
//! #[tokio::main]
//! async fn main() -> docsift::Result<()> {
//!     serve("0.0.0.0", 5005).await?;
//!     Ok(())
//! }
//! ```
//!
//! # cURL Examples
//!
//! ```bash
//! curl -F "file=@invoice.pdf" http://localhost:5005/extract
//! ```
//!
//! # Environment Variables
//!
//! ```bash
//! export DOCSIFT_HOST=0.0.0.0
//! export DOCSIFT_PORT=5005
//!
//! # Default: allows all origins
//! export DOCSIFT_CORS_ORIGINS="https://app.example.com,https://api.example.com"
//!
//! # Upload size limits (default: 100 MB)
//! export DOCSIFT_MAX_REQUEST_BODY_BYTES=104857600
//! export DOCSIFT_MAX_MULTIPART_FIELD_BYTES=104857600
//! export DOCSIFT_MAX_UPLOAD_SIZE_MB=100
//! ```

mod error;
mod handlers;
mod server;
mod types;

pub use error::{ApiError, UNSUPPORTED_FILE_MESSAGE};
pub use handlers::FILE_FIELD;
pub use server::{
    DEFAULT_HOST, DEFAULT_PORT, create_router, create_router_with_backend, create_router_with_limits,
    parse_size_limits_from_env, serve, serve_default, serve_with_config, serve_with_config_and_limits,
};
pub use types::{ApiSizeLimits, ApiState, ErrorResponse, ExtractResponse};
