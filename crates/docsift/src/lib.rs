//! docsift - document extraction for PDF and DOCX
//!
//! docsift takes an uploaded PDF or DOCX and returns, in one result, the
//! document's embedded text, OCR text recognized from its embedded images,
//! and its tables as row records.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use docsift::{ExtractionConfig, extract_bytes};
//!
//! # async fn example() -> docsift::Result<()> {
//! let bytes = std::fs::read("invoice.pdf")?;
//! let result = extract_bytes(&bytes, "invoice.pdf", &ExtractionConfig::default()).await?;
//! println!("Text: {}", result.extracted_text);
//! println!("OCR: {}", result.ocr_text);
//! println!("Tables: {}", result.extracted_tables.len());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Core Module** (`core`): extraction pipeline, format detection, config loading
//! - **Extractors** (`extractors`): one `DocumentExtractor` per format
//! - **PDF** (`pdf`) / **Extraction** (`extraction`): format-level text, image and table readers
//! - **OCR** (`ocr`): `OcrBackend` implementations, Tesseract by default
//! - **API** (`api`, feature `api`): the `POST /extract` HTTP service

#![deny(unsafe_code)]

pub mod core;
pub mod error;
pub mod extraction;
pub mod extractors;
pub mod ocr;
pub mod pdf;
pub mod plugins;
pub mod types;

#[cfg(feature = "api")]
pub mod api;

pub use error::{DocsiftError, Result};
pub use types::*;

pub use core::config::{ExtractionConfig, OcrConfig, TableConfig};
pub use core::extractor::{default_ocr_backend, extract_bytes, extract_bytes_with_backend, extract_file};
pub use core::mime::{SUPPORTED_EXTENSIONS, detect_file_type};
pub use core::pipeline::aggregate;
pub use extractors::extractor_for;
pub use plugins::{DocumentExtractor, OcrBackend, OcrBackendType, Plugin};
