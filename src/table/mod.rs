//! Tabular data as it arrives from a parsed export, and the transforms
//! that reshape it into report columns.
//!
//! A [`RawTable`] is whatever the CSV or workbook parser produced: rows of
//! text cells with no width guarantee. [`filter`] removes blank rows and
//! [`mapper`] projects the remainder onto a fixed [`FieldMapping`].

pub mod filter;
pub mod mapper;

pub use filter::filter_blank_rows;
pub use mapper::{ColumnMapping, FieldMapping, FieldSpec, MappedTable};

/// One row of cells. Empty cells are empty strings.
pub type Row = Vec<String>;

/// Unprocessed rows of cells extracted from an input file.
///
/// Rows are independently lengthed; nothing guarantees a fixed width.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    rows: Vec<Row>,
}

impl RawTable {
    /// Wrap parsed rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Build a table from string slices. Handy in tests and fixtures.
    pub fn from_strs<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|c| c.as_ref().to_string()).collect())
                .collect(),
        }
    }

    /// All rows, header rows included.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the table and return its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows at all.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Width of the widest row.
    pub fn max_columns(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Split into the header row at `header_row` and the rows after it.
    ///
    /// Returns `None` when the table has no row at that offset. Rows before
    /// the header (export banners, blank padding) are dropped.
    pub fn split_header(&self, header_row: usize) -> Option<(&Row, &[Row])> {
        let header = self.rows.get(header_row)?;
        Some((header, &self.rows[header_row + 1..]))
    }
}

impl From<Vec<Row>> for RawTable {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

/// Column headers plus body rows, ready for layout.
///
/// Produced either by the field mapper or directly from a raw table for
/// report variants that print the source columns as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableData {
    /// Column headers in display order.
    pub headers: Vec<String>,
    /// Body rows.
    pub rows: Vec<Row>,
}

impl TableData {
    /// Take headers and body straight from a raw table without projection.
    ///
    /// Yields an empty table when the header row is missing.
    pub fn from_raw(table: &RawTable, header_row: usize) -> Self {
        match table.split_header(header_row) {
            Some((headers, body)) => Self {
                headers: headers.clone(),
                rows: body.to_vec(),
            },
            None => Self::default(),
        }
    }

    /// Number of header columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

impl From<MappedTable> for TableData {
    fn from(mapped: MappedTable) -> Self {
        Self {
            headers: mapped.headers,
            rows: mapped.rows,
        }
    }
}
