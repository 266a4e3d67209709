//! PDF document processing.
//!
//! Low-level functions used by the PDF extractor: page text, embedded images
//! and ruled tables. Each entry point parses the bytes itself with `lopdf`, so
//! the three can run concurrently without sharing a document handle.
//!
//! # Example
//!
//! ```rust,no_run
//! use docsift::pdf::{extract_images_from_pdf, extract_text_from_pdf};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pdf_bytes = std::fs::read("document.pdf")?;
//! let text = extract_text_from_pdf(&pdf_bytes)?;
//! let images = extract_images_from_pdf(&pdf_bytes)?;
//! println!("{} chars, {} images", text.len(), images.len());
//! # Ok(())
//! # }
//! ```
pub mod content;
pub mod document;
pub mod error;
pub mod images;
pub mod table;
pub mod text;

pub use error::PdfError;
pub use images::extract_images_from_pdf;
pub use table::extract_tables_from_pdf;
pub use text::extract_text_from_pdf;
