//! OCR (Optical Character Recognition) subsystem.
//!
//! Embedded images are recognized one at a time through an
//! [`OcrBackend`](crate::plugins::OcrBackend). The default backend shells out
//! to the `tesseract` executable.
//!
//! # Example
//!
//! ```rust,no_run
//! use docsift::core::config::OcrConfig;
//! use docsift::ocr::{TesseractBackend, run_ocr};
//!
//! # async fn example(images: Vec<docsift::NormalizedImage>) -> docsift::Result<()> {
//! let backend = TesseractBackend::new();
//! let text = run_ocr(&images, &backend, &OcrConfig::default()).await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```
pub mod error;
pub mod processor;
pub mod tesseract_backend;
pub mod validation;

pub use error::OcrError;
pub use processor::run_ocr;
pub use tesseract_backend::TesseractBackend;
pub use validation::validate_language_code;
