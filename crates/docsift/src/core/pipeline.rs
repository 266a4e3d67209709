//! Result aggregation.

use crate::types::{ExtractedTable, ExtractionResult, FileType};

/// Compose the outputs of the three extraction branches into one result.
pub fn aggregate(
    file_type: FileType,
    extracted_text: String,
    ocr_text: String,
    extracted_image_count: usize,
    extracted_tables: Vec<ExtractedTable>,
) -> ExtractionResult {
    ExtractionResult {
        file_type,
        extracted_text,
        ocr_text,
        extracted_image_count,
        extracted_tables,
    }
}
