//! Shared lopdf helpers: loading, reference resolution and page resources.

use super::error::{PdfError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId};

/// How deeply form XObjects may nest before further `Do` calls are skipped.
pub const MAX_FORM_DEPTH: usize = 12;

/// Parse PDF bytes into a fresh lopdf document.
///
/// Every stage calls this on its own so no parser handle is shared across threads.
pub fn load_document(pdf_bytes: &[u8]) -> Result<Document> {
    if pdf_bytes.is_empty() {
        return Err(PdfError::InvalidPdf("document is empty".to_string()));
    }

    let document = Document::load_mem(pdf_bytes)?;
    if document.get_pages().is_empty() {
        return Err(PdfError::InvalidPdf("document has no pages".to_string()));
    }
    Ok(document)
}

/// Follow indirect references until a direct object is reached.
pub fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    let mut current = object;
    // Bounded to guard against reference cycles.
    for _ in 0..32 {
        match current {
            Object::Reference(id) => current = doc.get_object(*id)?,
            other => return Ok(other),
        }
    }
    Err(PdfError::InvalidPdf("reference chain too deep".to_string()))
}

/// Resolve `key` in `dict` to a dictionary, if present.
pub fn resolve_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    let object = dict.get(key).ok()?;
    match resolve(doc, object).ok()? {
        Object::Dictionary(found) => Some(found),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Resources dictionary of a page, inherited from the page tree if needed.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..64 {
        if let Some(resources) = resolve_dict(doc, node, b"Resources") {
            return Some(resources);
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Decoded content stream bytes of a page. Pages without contents yield an empty buffer.
pub fn page_content(doc: &Document, page_id: ObjectId) -> Result<Vec<u8>> {
    let page = doc.get_dictionary(page_id)?;
    let contents = match page.get(b"Contents") {
        Ok(contents) => resolve(doc, contents)?,
        Err(_) => return Ok(Vec::new()),
    };

    match contents {
        Object::Stream(stream) => stream_bytes(stream),
        Object::Array(parts) => {
            let mut content = Vec::new();
            for part in parts {
                if let Object::Stream(stream) = resolve(doc, part)? {
                    content.extend_from_slice(&stream_bytes(stream)?);
                    content.push(b'\n');
                }
            }
            Ok(content)
        }
        _ => Err(PdfError::ContentStreamFailed("invalid /Contents entry".to_string())),
    }
}

/// Stream payload with any filters undone.
pub fn stream_bytes(stream: &lopdf::Stream) -> Result<Vec<u8>> {
    if stream.dict.get(b"Filter").is_err() {
        return Ok(stream.content.clone());
    }
    stream
        .decompressed_content()
        .map_err(|e| PdfError::ContentStreamFailed(e.to_string()))
}

/// Whether an XObject stream dictionary declares the given `/Subtype`.
pub fn is_xobject_subtype(dict: &Dictionary, subtype: &[u8]) -> bool {
    dict.get(b"Subtype")
        .and_then(Object::as_name)
        .map(|found| found == subtype)
        .unwrap_or(false)
}

/// Read a numeric operand as `f32`.
pub fn number(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}
