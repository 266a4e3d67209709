//! DOCX (Office Open XML) extraction.
//!
//! A DOCX file is a ZIP package. Body text and tables live in
//! `word/document.xml`; embedded pictures are package parts reached through
//! `word/_rels/document.xml.rels`. Each public function opens the package on
//! its own.

use crate::error::{DocsiftError, Result};
use crate::extraction::image::normalize_image_bytes;
use crate::extraction::table::rows_to_records;
use crate::types::{ExtractedTable, NormalizedImage};
use roxmltree::{Document, Node};
use std::io::{Cursor, Read};
use zip::ZipArchive;

const W_NAMESPACE: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

struct DocxPackage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> DocxPackage<'a> {
    fn open(bytes: &'a [u8]) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| DocsiftError::corrupt_document_with_source("Failed to open DOCX as ZIP", e))?;
        Ok(Self { archive })
    }

    fn read_bytes(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.archive.by_name(path) {
            Ok(file) => file,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => {
                return Err(DocsiftError::corrupt_document_with_source(
                    format!("Failed to read {}", path),
                    e,
                ));
            }
        };

        let mut content = Vec::new();
        file.read_to_end(&mut content)
            .map_err(|e| DocsiftError::corrupt_document_with_source(format!("Failed to read {}", path), e))?;
        Ok(Some(content))
    }

    fn read_xml(&mut self, path: &str) -> Result<Option<String>> {
        match self.read_bytes(path)? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| DocsiftError::corrupt_document_with_source(format!("{} is not valid UTF-8", path), e)),
            None => Ok(None),
        }
    }

    fn document_xml(&mut self) -> Result<String> {
        self.read_xml(DOCUMENT_PART)?
            .ok_or_else(|| DocsiftError::corrupt_document(format!("DOCX package has no {}", DOCUMENT_PART)))
    }
}

fn parse_xml(xml: &str) -> Result<Document<'_>> {
    Document::parse(xml).map_err(|e| DocsiftError::corrupt_document_with_source("Malformed DOCX XML", e))
}

fn is_w(node: &Node<'_, '_>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == Some(W_NAMESPACE)
}

fn w_attribute<'a>(node: &Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attribute((W_NAMESPACE, name))
}

fn body<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>> {
    doc.root_element()
        .children()
        .find(|n| is_w(n, "body"))
        .ok_or_else(|| DocsiftError::corrupt_document("DOCX document has no body"))
}

/// Inline wrappers whose runs belong to the enclosing paragraph.
const RUN_CONTAINERS: &[&str] = &[
    "hyperlink",
    "ins",
    "moveTo",
    "smartTag",
    "fldSimple",
    "customXml",
    "sdt",
    "sdtContent",
    "dir",
    "bdo",
];

/// Append the text of runs under `node`, in document order.
///
/// Only a run's own `t`, `tab`, `br` and `cr` children count, so drawings,
/// text boxes and alternate content nested in a run add nothing.
fn collect_runs(node: Node<'_, '_>, text: &mut String) {
    for child in node.children().filter(Node::is_element) {
        if is_w(&child, "r") {
            for part in child.children() {
                if is_w(&part, "t") {
                    text.push_str(part.text().unwrap_or(""));
                } else if is_w(&part, "tab") {
                    text.push('\t');
                } else if is_w(&part, "br") || is_w(&part, "cr") {
                    text.push('\n');
                }
            }
        } else if RUN_CONTAINERS.iter().any(|name| is_w(&child, name)) {
            collect_runs(child, text);
        }
    }
}

/// Text of one paragraph: runs in order, tabs as `\t`, breaks as `\n`.
fn paragraph_text(paragraph: Node<'_, '_>) -> String {
    let mut text = String::new();
    collect_runs(paragraph, &mut text);
    text
}

/// Extract body paragraph text, paragraphs joined with `\n`.
///
/// Only top-level paragraphs count; text inside tables is reported through
/// [`extract_tables`].
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let mut package = DocxPackage::open(bytes)?;
    let xml = package.document_xml()?;
    let doc = parse_xml(&xml)?;

    let paragraphs: Vec<String> = body(&doc)?
        .children()
        .filter(|n| is_w(n, "p"))
        .map(paragraph_text)
        .collect();

    Ok(paragraphs.join("\n"))
}

fn cell_text(cell: Node<'_, '_>) -> String {
    cell.children()
        .filter(|n| is_w(n, "p"))
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

fn cell_properties<'a, 'input>(cell: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    cell.children().find(|n| is_w(n, "tcPr"))
}

fn grid_span(cell: Node<'_, '_>) -> usize {
    cell_properties(cell)
        .and_then(|props| props.children().find(|n| is_w(n, "gridSpan")))
        .and_then(|span| w_attribute(&span, "val"))
        .and_then(|val| val.parse::<usize>().ok())
        .filter(|span| *span > 0)
        .unwrap_or(1)
}

fn continues_vertical_merge(cell: Node<'_, '_>) -> bool {
    cell_properties(cell)
        .and_then(|props| props.children().find(|n| is_w(n, "vMerge")))
        .is_some_and(|merge| w_attribute(&merge, "val").is_none_or(|val| val == "continue"))
}

/// Read a table as rows of trimmed cell text.
///
/// Horizontally merged cells repeat once per grid column they span, and
/// vertically merged continuation cells repeat the text of the cell above.
fn table_rows(table: Node<'_, '_>) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();

    for row in table.children().filter(|n| is_w(n, "tr")) {
        let mut cells = Vec::new();
        for cell in row.children().filter(|n| is_w(n, "tc")) {
            let column = cells.len();
            let text = if continues_vertical_merge(cell) {
                rows.last()
                    .and_then(|above| above.get(column))
                    .cloned()
                    .unwrap_or_default()
            } else {
                cell_text(cell)
            };
            for _ in 0..grid_span(cell) {
                cells.push(text.clone());
            }
        }
        rows.push(cells);
    }

    rows
}

/// Extract body-level tables in document order.
///
/// Table indices are 1-based across the whole document. Cells are trimmed and
/// kept as-is; no blank rows or columns are removed.
pub fn extract_tables(bytes: &[u8]) -> Result<Vec<ExtractedTable>> {
    let mut package = DocxPackage::open(bytes)?;
    let xml = package.document_xml()?;
    let doc = parse_xml(&xml)?;

    let tables: Vec<ExtractedTable> = body(&doc)?
        .children()
        .filter(|n| is_w(n, "tbl"))
        .enumerate()
        .map(|(index, table)| ExtractedTable {
            page: None,
            table_index: index + 1,
            data: rows_to_records(table_rows(table)),
        })
        .collect();

    tracing::debug!(tables = tables.len(), "Extracted DOCX tables");
    Ok(tables)
}

/// Resolve a relationship target against the `word/` directory.
fn resolve_target(target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts = vec!["word"];
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

/// Package paths of image relationships, in relationship file order.
fn image_targets(rels_xml: &str) -> Result<Vec<String>> {
    let doc = parse_xml(rels_xml)?;
    let targets = doc
        .root_element()
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "Relationship")
        .filter(|rel| rel.attribute("TargetMode") != Some("External"))
        .filter_map(|rel| {
            let target = rel.attribute("Target")?;
            let kind = rel.attribute("Type").unwrap_or("");
            (kind.contains("image") || target.contains("image")).then(|| resolve_target(target))
        })
        .collect();
    Ok(targets)
}

/// Extract every image part referenced by the main document, normalized to PNG.
pub fn extract_images(bytes: &[u8]) -> Result<Vec<NormalizedImage>> {
    let mut package = DocxPackage::open(bytes)?;
    let Some(rels_xml) = package.read_xml(DOCUMENT_RELS_PART)? else {
        return Ok(Vec::new());
    };

    let mut images = Vec::new();
    for target in image_targets(&rels_xml)? {
        let data = package
            .read_bytes(&target)?
            .ok_or_else(|| DocsiftError::corrupt_document(format!("Image part {} is missing", target)))?;
        images.push(normalize_image_bytes(&data)?);
    }

    tracing::debug!(images = images.len(), "Extracted DOCX images");
    Ok(images)
}
