//! API server setup and configuration.

use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::core::extractor::default_ocr_backend;
use crate::plugins::{OcrBackend, Plugin};
use crate::{DocsiftError, ExtractionConfig, Result};

use super::{
    handlers::extract_handler,
    types::{ApiSizeLimits, ApiState},
};

/// Default bind address, all interfaces.
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5005;

/// Parse size limits from environment variables.
///
/// Reads, in order of preference:
/// 1. `DOCSIFT_MAX_REQUEST_BODY_BYTES` - maximum total request body size (bytes),
///    with `DOCSIFT_MAX_MULTIPART_FIELD_BYTES` for a single field (defaults to the same value)
/// 2. `DOCSIFT_MAX_UPLOAD_SIZE_MB` - one limit in MB applied to both
///
/// Falls back to 100 MB if unset or invalid.
pub fn parse_size_limits_from_env() -> ApiSizeLimits {
    if let Ok(value) = std::env::var("DOCSIFT_MAX_REQUEST_BODY_BYTES") {
        match value.parse::<usize>() {
            Ok(bytes) if bytes > 0 => {
                let multipart_bytes = std::env::var("DOCSIFT_MAX_MULTIPART_FIELD_BYTES")
                    .ok()
                    .and_then(|v| v.parse::<usize>().ok())
                    .filter(|v| *v > 0)
                    .unwrap_or(bytes);

                tracing::info!(
                    request_body_bytes = bytes,
                    multipart_field_bytes = multipart_bytes,
                    "Upload size limits configured from environment"
                );
                return ApiSizeLimits::new(bytes, multipart_bytes);
            }
            _ => tracing::warn!(
                "Failed to parse DOCSIFT_MAX_REQUEST_BODY_BYTES='{}', must be a positive integer",
                value
            ),
        }
    }

    if let Ok(value) = std::env::var("DOCSIFT_MAX_UPLOAD_SIZE_MB") {
        match value.parse::<usize>() {
            Ok(mb) if mb > 0 => {
                tracing::info!("Upload size limit configured from environment: {} MB", mb);
                return ApiSizeLimits::from_mb(mb, mb);
            }
            _ => tracing::warn!(
                "Failed to parse DOCSIFT_MAX_UPLOAD_SIZE_MB='{}', must be a positive integer",
                value
            ),
        }
    }

    let limits = ApiSizeLimits::default();
    tracing::info!(
        "Upload size limit: 100 MB (default, {} bytes) - configure with DOCSIFT_MAX_REQUEST_BODY_BYTES or DOCSIFT_MAX_UPLOAD_SIZE_MB",
        limits.max_request_body_bytes
    );
    limits
}

fn cors_layer() -> CorsLayer {
    if let Ok(origins_str) = std::env::var("DOCSIFT_CORS_ORIGINS") {
        let origins: Vec<_> = origins_str
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if !origins.is_empty() {
            tracing::info!("CORS configured with {} explicit allowed origin(s)", origins.len());
            return CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any);
        }

        tracing::warn!("DOCSIFT_CORS_ORIGINS set but empty/invalid - falling back to permissive CORS");
    } else {
        tracing::warn!(
            "CORS configured to allow all origins (default). For production, set DOCSIFT_CORS_ORIGINS \
             to a comma-separated list of allowed origins"
        );
    }

    CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
}

/// Create the API router with default limits and the Tesseract OCR backend.
///
/// This is public to allow embedding the router in another application.
///
/// # Examples
///
/// ```no_run
/// use docsift::{ExtractionConfig, api::create_router};
///
/// let router = create_router(ExtractionConfig::default());
/// let app = axum::Router::new().nest("/docs", router);
/// ```
pub fn create_router(config: ExtractionConfig) -> Router {
    create_router_with_backend(config, ApiSizeLimits::default(), default_ocr_backend())
}

/// Create the API router with custom size limits.
pub fn create_router_with_limits(config: ExtractionConfig, limits: ApiSizeLimits) -> Router {
    create_router_with_backend(config, limits, default_ocr_backend())
}

/// Create the API router with custom limits and OCR backend.
pub fn create_router_with_backend(
    config: ExtractionConfig,
    limits: ApiSizeLimits,
    ocr_backend: Arc<dyn OcrBackend>,
) -> Router {
    let state = ApiState {
        config: Arc::new(config),
        ocr_backend,
    };

    Router::new()
        .route("/extract", post(extract_handler))
        .layer(DefaultBodyLimit::max(limits.max_multipart_field_bytes))
        .layer(RequestBodyLimitLayer::new(limits.max_request_body_bytes))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server with config file discovery.
///
/// Searches for `docsift.toml` in the current and parent directories; falls
/// back to the default configuration. Size limits come from the environment.
///
/// # Examples
///
/// ```no_run
/// use docsift::api::serve;
///
/// #[tokio::main]
/// async fn main() -> docsift::Result<()> {
///     serve("0.0.0.0", 5005).await
/// }
/// ```
pub async fn serve(host: impl AsRef<str>, port: u16) -> Result<()> {
    let config = match ExtractionConfig::discover()? {
        Some(config) => {
            tracing::info!("Loaded extraction config from discovered file");
            config
        }
        None => {
            tracing::info!("No config file found, using default configuration");
            ExtractionConfig::default()
        }
    };

    serve_with_config(host, port, config).await
}

/// Start the API server with an explicit config; size limits come from the environment.
pub async fn serve_with_config(host: impl AsRef<str>, port: u16, config: ExtractionConfig) -> Result<()> {
    let limits = parse_size_limits_from_env();
    serve_with_config_and_limits(host, port, config, limits).await
}

/// Start the API server with explicit config and size limits.
pub async fn serve_with_config_and_limits(
    host: impl AsRef<str>,
    port: u16,
    config: ExtractionConfig,
    limits: ApiSizeLimits,
) -> Result<()> {
    let ip: IpAddr = host
        .as_ref()
        .parse()
        .map_err(|e| DocsiftError::validation(format!("Invalid host address: {}", e)))?;

    let backend = crate::ocr::TesseractBackend::with_command(config.ocr.tesseract_cmd.clone());
    match backend.initialize() {
        Ok(()) => tracing::info!(backend = backend.name(), version = %backend.version(), "OCR backend available"),
        Err(e) => tracing::warn!("{}; documents with embedded images will fail", e),
    }

    let addr = SocketAddr::new(ip, port);
    let app = create_router_with_backend(config, limits, Arc::new(backend));

    tracing::info!("Starting docsift API server on http://{}:{}", ip, port);

    let listener = tokio::net::TcpListener::bind(addr).await.map_err(DocsiftError::Io)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| DocsiftError::Other(e.to_string()))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Start the API server on `DOCSIFT_HOST` / `DOCSIFT_PORT`, defaulting to `0.0.0.0:5005`.
pub async fn serve_default() -> Result<()> {
    let host = std::env::var("DOCSIFT_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port = match std::env::var("DOCSIFT_PORT") {
        Ok(value) => value.parse::<u16>().unwrap_or_else(|_| {
            tracing::warn!("Invalid DOCSIFT_PORT='{}', using {}", value, DEFAULT_PORT);
            DEFAULT_PORT
        }),
        Err(_) => DEFAULT_PORT,
    };
    serve(host, port).await
}
