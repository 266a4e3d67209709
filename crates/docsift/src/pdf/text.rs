//! PDF text extraction.
//!
//! Page text comes from lopdf's content-stream text extraction. Pages are
//! visited in page-tree order and joined with a single newline. Text runs that
//! cannot be decoded (for example a CID font without `/ToUnicode`) are skipped
//! with a warning, so such a page contributes whatever did decode, possibly an
//! empty string.

use super::document::load_document;
use super::error::Result;
use lopdf::Document;

/// Extract the plain text of one page, dropping chunks that fail to decode.
fn page_text(document: &Document, page_number: u32) -> String {
    let mut text = String::new();
    let mut skipped = 0usize;

    for chunk in document.extract_text_chunks(&[page_number]) {
        match chunk {
            Ok(chunk) => text.push_str(&chunk),
            Err(e) => {
                skipped += 1;
                tracing::warn!(page = page_number, error = %e, "Skipping undecodable PDF text");
            }
        }
    }

    if skipped > 0 {
        tracing::debug!(page = page_number, skipped, "Page text extracted partially");
    }
    text
}

/// Extract the plain text of every page, in page order.
pub fn extract_page_texts(document: &Document) -> Vec<String> {
    document
        .get_pages()
        .keys()
        .map(|page_number| page_text(document, *page_number))
        .collect()
}

/// Extract all selectable text from PDF bytes, pages joined with `\n`.
pub fn extract_text_from_pdf(pdf_bytes: &[u8]) -> Result<String> {
    let document = load_document(pdf_bytes)?;
    let texts = extract_page_texts(&document);
    tracing::debug!(pages = texts.len(), "Extracted PDF page text");
    Ok(texts.join("\n"))
}
