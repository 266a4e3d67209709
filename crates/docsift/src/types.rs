use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Container format of an uploaded document.
///
/// Serializes as the upper-case tag reported to clients (`"PDF"` / `"DOCX"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    #[serde(rename = "PDF")]
    Pdf,
    #[serde(rename = "DOCX")]
    Docx,
}

impl FileType {
    /// Route an uploaded file name to its format by suffix.
    ///
    /// See [`crate::core::mime::detect_file_type`].
    pub fn from_filename(file_name: &str) -> crate::Result<Self> {
        crate::core::mime::detect_file_type(file_name)
    }

    pub fn from_extension(extension: &str) -> crate::Result<Self> {
        crate::core::mime::file_type_from_extension(extension)
    }

    /// Upper-case tag used in responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Pdf => "PDF",
            FileType::Docx => "DOCX",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One table row: positional column label (`"0"`, `"1"`, ...) to cell text.
///
/// Insertion order follows column order, so serialized rows keep their layout.
pub type RowRecord = IndexMap<String, String>;

/// A table found in a document, normalized into row records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedTable {
    /// 1-based page the table was found on. DOCX tables carry no page.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub page: Option<usize>,
    /// 1-based position of the table, per page for PDF and global for DOCX.
    pub table_index: usize,
    pub data: Vec<RowRecord>,
}

/// An embedded raster image re-encoded as PNG.
///
/// Produced by the image stage and consumed by OCR; never part of the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    /// PNG-encoded bytes.
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Combined output of every extraction stage for one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub file_type: FileType,
    /// Embedded selectable text.
    pub extracted_text: String,
    /// Concatenated OCR output, one `\n`-terminated chunk per image.
    pub ocr_text: String,
    /// Number of embedded images that were extracted and recognized.
    pub extracted_image_count: usize,
    pub extracted_tables: Vec<ExtractedTable>,
}
