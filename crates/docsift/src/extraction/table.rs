//! Table normalization.
//!
//! Raw tables arrive as a grid of optional cell strings. They leave as row
//! records: ordered maps from positional column label (`"0"`, `"1"`, ...) to
//! cell text.

use crate::types::RowRecord;

/// A raw table grid. `None` marks a cell the detector could not place.
pub type RawGrid = Vec<Vec<Option<String>>>;

fn is_blank(cell: Option<&Option<String>>) -> bool {
    match cell {
        None | Some(None) => true,
        Some(Some(text)) => text.trim().is_empty(),
    }
}

/// Drop rows and columns that are blank in every cell, then convert to records.
///
/// Both passes look at the same raw grid, so a column is kept when it has text
/// in any row, including rows that are themselves dropped. Kept columns keep
/// their original positional label. Absent cells in kept rows become `""`.
pub fn prune_blank(grid: &RawGrid) -> Vec<RowRecord> {
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);

    let kept_columns: Vec<usize> = (0..width)
        .filter(|col| grid.iter().any(|row| !is_blank(row.get(*col))))
        .collect();

    grid.iter()
        .filter(|row| row.iter().any(|cell| !is_blank(Some(cell))))
        .map(|row| {
            kept_columns
                .iter()
                .map(|col| {
                    let text = row.get(*col).cloned().flatten().unwrap_or_default();
                    (col.to_string(), text)
                })
                .collect()
        })
        .collect()
}

/// Convert rows of cell text to records with positional labels, keeping every cell.
pub fn rows_to_records(rows: Vec<Vec<String>>) -> Vec<RowRecord> {
    rows.into_iter()
        .map(|row| {
            row.into_iter()
                .enumerate()
                .map(|(index, text)| (index.to_string(), text))
                .collect()
        })
        .collect()
}
