//! Core extraction orchestration.
//!
//! Entry points, format detection, configuration, file I/O and result
//! aggregation.
//!
//! # Example
//!
//! ```rust,no_run
//! use docsift::core::config::ExtractionConfig;
//! use docsift::core::extractor::{default_ocr_backend, extract_file};
//!
//! # async fn example() -> docsift::Result<()> {
//! let config = ExtractionConfig::default();
//! let result = extract_file("document.pdf", &config, default_ocr_backend()).await?;
//! println!("Extracted text: {}", result.extracted_text);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extractor;
pub mod io;
pub mod mime;
pub mod pipeline;

pub use config::{ExtractionConfig, OcrConfig, TableConfig};
pub use extractor::{default_ocr_backend, extract_bytes, extract_bytes_with_backend, extract_file};
pub use pipeline::aggregate;
