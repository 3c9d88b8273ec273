//! Source loading.
//!
//! Files are read with `tokio::fs` and parsed on the blocking pool, so a
//! large workbook never stalls the runtime. Both parsers produce a
//! [`RawTable`] of text cells; nothing here knows about headers or
//! mappings.
//!
//! # Examples
//!
//! ```no_run
//! use sheetpdf::io::reader::SourceReader;
//! use sheetpdf::profile::SourceFormat;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let loaded = SourceReader::new()
//!     .load(Path::new("timesheet.csv"), SourceFormat::Csv)
//!     .await?;
//! println!("{} row(s) in {:?}", loaded.table.len(), loaded.load_time);
//! # Ok(())
//! # }
//! ```

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use chrono::{Datelike, NaiveDateTime, Timelike};
use tokio::task;

use crate::error::{Result, SheetPdfError};
use crate::profile::SourceFormat;
use crate::table::{RawTable, Row};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A parsed source file.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    /// Parsed rows.
    pub table: RawTable,
    /// Where it came from.
    pub path: PathBuf,
    /// Size on disk in bytes.
    pub file_size: u64,
    /// Time spent reading and parsing.
    pub load_time: Duration,
}

/// Reads CSV and workbook sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceReader {
    delimiter: Option<u8>,
}

impl SourceReader {
    /// Reader with comma-separated CSV.
    pub fn new() -> Self {
        Self { delimiter: None }
    }

    /// Use a different CSV delimiter.
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter: Some(delimiter),
        }
    }

    /// Read and parse `path` as `format`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub async fn load(&self, path: &Path, format: SourceFormat) -> Result<LoadedTable> {
        let start = Instant::now();
        let bytes = read_file(path).await?;
        let file_size = bytes.len() as u64;

        let path_buf = path.to_path_buf();
        let delimiter = self.delimiter.unwrap_or(b',');
        let table = task::spawn_blocking(move || match format {
            SourceFormat::Csv => parse_csv(&bytes, delimiter),
            SourceFormat::Workbook => parse_workbook(bytes),
        })
        .await
        .map_err(|e| SheetPdfError::other(format!("Parse task failed: {e}")))?
        .map_err(|reason| SheetPdfError::parse_failed(path_buf.clone(), reason))?;

        log::debug!(
            "Parsed {} row(s) from {}",
            table.len(),
            path_buf.display()
        );

        Ok(LoadedTable {
            table,
            path: path_buf,
            file_size,
            load_time: start.elapsed(),
        })
    }
}

/// Read a whole file, mapping a missing file to
/// [`SheetPdfError::FileNotFound`].
pub async fn read_file(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SheetPdfError::file_not_found(path.to_path_buf())
        } else {
            SheetPdfError::FileNotAccessible {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Parse CSV bytes into rows. Every record is kept, including the header
/// line; ragged rows are allowed and invalid UTF-8 is replaced.
pub fn parse_csv(bytes: &[u8], delimiter: u8) -> std::result::Result<RawTable, String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(bytes);

    let mut rows = Vec::new();
    for record in reader.byte_records() {
        let record = record.map_err(|e| e.to_string())?;
        let row: Row = record
            .iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect();
        rows.push(row);
    }

    Ok(RawTable::new(rows))
}

/// Parse the first sheet of an `.xlsx` or `.xls` workbook.
pub fn parse_workbook(bytes: Vec<u8>) -> std::result::Result<RawTable, String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "No worksheet found".to_string())?
        .map_err(|e| e.to_string())?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();

    Ok(RawTable::new(rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(format_datetime)
            .unwrap_or_else(|| cell.to_string()),
        other => other.to_string(),
    }
}

fn format_datetime(value: NaiveDateTime) -> String {
    let midnight = value.hour() == 0 && value.minute() == 0 && value.second() == 0;
    if midnight {
        value.format("%Y-%m-%d").to_string()
    } else if value.year() < 1900 {
        // time-of-day cells carry the epoch as their date
        value.format("%H:%M").to_string()
    } else {
        value.format("%Y-%m-%d %H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_csv_keeps_header_and_blank_rows() {
        let table = parse_csv(b"Name,Status\nAlice,Done\n,\n", b',').unwrap();
        assert_eq!(
            table,
            RawTable::from_strs([vec!["Name", "Status"], vec!["Alice", "Done"], vec!["", ""]])
        );
    }

    #[test]
    fn test_parse_csv_strips_bom_and_allows_ragged_rows() {
        let table = parse_csv(b"\xEF\xBB\xBFName,Status\nAlice\n", b',').unwrap();
        assert_eq!(table.rows()[0][0], "Name");
        assert_eq!(table.rows()[1], vec!["Alice".to_string()]);
    }

    #[test]
    fn test_parse_csv_quoted_fields() {
        let table = parse_csv(b"Remark\n\"late, traffic\"\n", b',').unwrap();
        assert_eq!(table.rows()[1][0], "late, traffic");
    }

    #[test]
    fn test_parse_csv_semicolon() {
        let table = parse_csv(b"a;b\n1;2\n", b';').unwrap();
        assert_eq!(table.rows()[1], vec!["1".to_string(), "2".to_string()]);
    }

    #[test]
    fn test_parse_workbook_rejects_garbage() {
        assert!(parse_workbook(b"not a workbook".to_vec()).is_err());
    }

    #[test]
    fn test_format_datetime() {
        let date = chrono::NaiveDate::from_ymd_opt(2025, 1, 6).unwrap();
        assert_eq!(format_datetime(date.and_hms_opt(0, 0, 0).unwrap()), "2025-01-06");
        assert_eq!(
            format_datetime(date.and_hms_opt(8, 30, 0).unwrap()),
            "2025-01-06 08:30"
        );
        let epoch = chrono::NaiveDate::from_ymd_opt(1899, 12, 31).unwrap();
        assert_eq!(format_datetime(epoch.and_hms_opt(17, 5, 0).unwrap()), "17:05");
    }

    #[tokio::test]
    async fn test_load_csv() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("timesheet.csv");
        std::fs::write(&path, "Name,Status\nAlice,Done\n").unwrap();

        let loaded = SourceReader::new().load(&path, SourceFormat::Csv).await.unwrap();
        assert_eq!(loaded.table.len(), 2);
        assert_eq!(loaded.file_size, 23);
        assert_eq!(loaded.path, path);
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let result = SourceReader::new()
            .load(Path::new("/nonexistent/timesheet.csv"), SourceFormat::Csv)
            .await;
        assert!(matches!(result, Err(SheetPdfError::FileNotFound { .. })));
    }

    #[tokio::test]
    async fn test_load_invalid_workbook() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("attendance.xlsx");
        std::fs::write(&path, "plain text").unwrap();

        let result = SourceReader::new().load(&path, SourceFormat::Workbook).await;
        assert!(matches!(result, Err(SheetPdfError::ParseFailed { .. })));
    }
}
