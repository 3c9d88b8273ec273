//! Blank-row removal.

use super::{RawTable, Row};

/// Whether a row has at least one cell with non-whitespace content.
pub fn is_meaningful(row: &[String]) -> bool {
    row.iter().any(|cell| !cell.trim().is_empty())
}

/// Keep only rows where at least one trimmed cell is non-empty.
///
/// Order is preserved. An empty result is the caller's signal to stop with
/// [`SheetPdfError::NoValidData`](crate::SheetPdfError::NoValidData)
/// rather than render an empty document.
pub fn filter_blank_rows(table: &RawTable) -> RawTable {
    let rows: Vec<Row> = table
        .rows()
        .iter()
        .filter(|row| is_meaningful(row))
        .cloned()
        .collect();

    let dropped = table.len() - rows.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} blank row(s)");
    }

    RawTable::new(rows)
}
