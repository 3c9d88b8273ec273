//! From parsed rows to a finished report.
//!
//! [`prepare`] filters blank rows and shapes the table for a profile;
//! [`render_report`] lays it out and encodes the PDF. Attendance sources
//! additionally expose [`AttendanceStats`] and the employee name used to
//! pre-fill the settings.

use std::collections::HashSet;

use chrono::NaiveDateTime;

use crate::config::{Orientation, PdfConfig};
use crate::error::{Result, SheetPdfError};
use crate::layout::{PageLayout, ReportComposer, ReportContent};
use crate::profile::{JustificationColumns, ReportProfile};
use crate::render::PdfRenderer;
use crate::table::{RawTable, TableData, filter_blank_rows, filter::is_meaningful};

/// Employee number column of the attendance export.
pub const EMPLOYEE_NUMBER_COLUMN: usize = 1;
/// Employee name column of the attendance export.
pub const EMPLOYEE_NAME_COLUMN: usize = 2;
/// Date column of the attendance export.
pub const ATTENDANCE_DATE_COLUMN: usize = 5;

/// Table and side content ready for composition.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedReport {
    /// Headers and body.
    pub table: TableData,
    /// Lines for the justification box.
    pub justifications: Vec<String>,
}

/// Filter `raw` and shape it for `profile`.
///
/// With the header on the first row the whole table is filtered, so leading
/// blank lines are skipped. Sources with a later header keep their preamble
/// as-is and only the body is filtered.
///
/// # Errors
///
/// Returns [`SheetPdfError::NoValidData`] when no body row survives.
pub fn prepare(raw: &RawTable, profile: &ReportProfile) -> Result<PreparedReport> {
    let filtered = filter_rows(raw, profile.header_row);

    let table = match &profile.mapping {
        Some(mapping) => TableData::from(mapping.apply(&filtered, profile.header_row)),
        None => TableData::from_raw(&filtered, profile.header_row),
    };
    if table.rows.is_empty() {
        return Err(SheetPdfError::NoValidData);
    }

    let justifications = profile
        .justification
        .as_ref()
        .map(|columns| justification_lines(&table, columns))
        .unwrap_or_default();

    log::debug!(
        "Prepared {} row(s) x {} column(s) for the {} profile",
        table.rows.len(),
        table.column_count(),
        profile.kind
    );

    Ok(PreparedReport {
        table,
        justifications,
    })
}

fn filter_rows(raw: &RawTable, header_row: usize) -> RawTable {
    if header_row == 0 {
        return filter_blank_rows(raw);
    }

    let preamble = header_row + 1;
    let rows = raw
        .rows()
        .iter()
        .enumerate()
        .filter(|(idx, row)| *idx < preamble || is_meaningful(row))
        .map(|(_, row)| row.clone())
        .collect();
    RawTable::new(rows)
}

/// `"{date}: {remark}"` for every row with both a date and a remark.
pub fn justification_lines(table: &TableData, columns: &JustificationColumns) -> Vec<String> {
    let position = |name: &str| table.headers.iter().position(|h| h == name);
    let (Some(date_idx), Some(remark_idx)) = (position(columns.date), position(columns.remark))
    else {
        return Vec::new();
    };

    table
        .rows
        .iter()
        .filter_map(|row| {
            let date = row.get(date_idx).map(|s| s.trim()).unwrap_or_default();
            let remark = row.get(remark_idx).map(|s| s.trim()).unwrap_or_default();
            (!date.is_empty() && !remark.is_empty()).then(|| format!("{date}: {remark}"))
        })
        .collect()
}

/// Headline numbers of an attendance export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceStats {
    /// Data rows after the header.
    pub total_records: usize,
    /// Distinct non-empty employee numbers.
    pub unique_employees: usize,
    /// Distinct non-empty dates.
    pub distinct_dates: usize,
}

impl AttendanceStats {
    /// Count the rows after `header_row`. `None` when there are none.
    pub fn from_raw(raw: &RawTable, header_row: usize) -> Option<Self> {
        let (_, body) = raw.split_header(header_row)?;
        if body.is_empty() {
            return None;
        }

        let distinct = |column: usize| {
            body.iter()
                .filter_map(|row| row.get(column))
                .filter(|cell| !cell.trim().is_empty())
                .collect::<HashSet<_>>()
                .len()
        };

        Some(Self {
            total_records: body.len(),
            unique_employees: distinct(EMPLOYEE_NUMBER_COLUMN),
            distinct_dates: distinct(ATTENDANCE_DATE_COLUMN),
        })
    }
}

/// Name in the first data row of an attendance export.
pub fn first_employee_name(raw: &RawTable, header_row: usize) -> Option<String> {
    let (_, body) = raw.split_header(header_row)?;
    body.first()?
        .get(EMPLOYEE_NAME_COLUMN)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// A rendered report.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// Encoded PDF.
    pub bytes: Vec<u8>,
    /// Number of pages.
    pub page_count: usize,
    /// Orientation the pages were laid out in.
    pub orientation: Orientation,
    /// Data rows printed.
    pub rows: usize,
}

/// Lay out `prepared` for `profile` and encode it.
pub fn render_report(
    prepared: &PreparedReport,
    profile: &ReportProfile,
    config: &PdfConfig,
    printed_at: NaiveDateTime,
) -> Result<RenderedReport> {
    let layout = compose(prepared, profile, config, printed_at);
    let orientation = profile.orientation(config, prepared.table.column_count());

    let title = config
        .title()
        .unwrap_or(profile.layout.header.default_title)
        .to_string();
    let bytes = PdfRenderer::new().with_title(title).render(&layout)?;

    Ok(RenderedReport {
        bytes,
        page_count: layout.page_count(),
        orientation,
        rows: prepared.table.rows.len(),
    })
}

/// Lay out `prepared` without encoding it.
pub fn compose(
    prepared: &PreparedReport,
    profile: &ReportProfile,
    config: &PdfConfig,
    printed_at: NaiveDateTime,
) -> PageLayout {
    let orientation = profile.orientation(config, prepared.table.column_count());
    let content = ReportContent {
        table: prepared.table.clone(),
        justifications: prepared.justifications.clone(),
        printed_at,
    };
    ReportComposer::new(&profile.layout, config, orientation).compose(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileKind;
    use crate::table::{FieldMapping, FieldSpec};

    fn printed_at() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2025, 1, 6)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap()
    }

    fn attendance_rows() -> RawTable {
        let mut rows = vec![
            vec!["Attendance export"],
            vec![""],
            vec![
                "No.", "Emp No.", "Employee", "Dept", "Shift", "Date", "Shift Name", "Shift In",
                "Shift Out", "Actual In", "Actual Out", "Remark",
            ],
        ];
        rows.push(vec![
            "1", "E01", "Budi", "IT", "D", "2025-01-06", "Day", "08:00", "17:00", "08:05",
            "17:02", "",
        ]);
        rows.push(vec![
            "2", "E01", "Budi", "IT", "D", "2025-01-07", "Day", "08:00", "17:00", "09:10",
            "17:00", "Traffic",
        ]);
        rows.push(vec![
            "3", "E02", "Sari", "IT", "D", "2025-01-07", "Day", "08:00", "17:00", "08:00",
            "17:00", "8 (8:00)",
        ]);
        RawTable::from_strs(rows)
    }

    #[test]
    fn test_prepare_maps_and_drops_blank_rows() {
        let raw = RawTable::from_strs([
            vec!["Name", "Status"],
            vec!["Alice", "Done"],
            vec!["", ""],
        ]);
        let mut profile = ReportProfile::generic();
        profile.mapping = Some(FieldMapping::new(vec![
            FieldSpec::new("Name"),
            FieldSpec::new("Status"),
            FieldSpec::new("Owner"),
        ]));

        let prepared = prepare(&raw, &profile).unwrap();
        assert_eq!(prepared.table.headers, vec!["Name", "Status", "Owner"]);
        assert_eq!(prepared.table.rows, vec![vec!["Alice", "Done", ""]]);
    }

    #[test]
    fn test_prepare_unmapped_keeps_source_columns() {
        let raw = RawTable::from_strs([vec![""], vec!["A", "B", "C"], vec!["1", "2", "3"]]);
        let prepared = prepare(&raw, &ReportProfile::generic()).unwrap();
        assert_eq!(prepared.table.headers, vec!["A", "B", "C"]);
        assert_eq!(prepared.table.rows.len(), 1);
    }

    #[test]
    fn test_prepare_all_blank_is_no_valid_data() {
        let raw = RawTable::from_strs([vec!["Name"], vec![" "], vec![""]]);
        let result = prepare(&raw, &ReportProfile::generic());
        assert!(matches!(result, Err(SheetPdfError::NoValidData)));
    }

    #[test]
    fn test_offset_header_survives_blank_preamble() {
        let prepared = prepare(&attendance_rows(), &ReportProfile::attendance()).unwrap();
        assert_eq!(prepared.table.headers[0], "No.");
        assert_eq!(prepared.table.rows.len(), 3);
    }

    #[test]
    fn test_bps_justifications_skip_suppressed_remarks() {
        let prepared = prepare(&attendance_rows(), &ReportProfile::attendance_bps()).unwrap();
        assert_eq!(prepared.justifications, vec!["2025-01-07: Traffic"]);
        assert_eq!(prepared.table.column_count(), 10);
    }

    #[test]
    fn test_attendance_stats() {
        let stats = AttendanceStats::from_raw(&attendance_rows(), 2).unwrap();
        assert_eq!(
            stats,
            AttendanceStats {
                total_records: 3,
                unique_employees: 2,
                distinct_dates: 2,
            }
        );
        assert!(AttendanceStats::from_raw(&RawTable::from_strs([vec!["x"]]), 2).is_none());
    }

    #[test]
    fn test_first_employee_name() {
        assert_eq!(
            first_employee_name(&attendance_rows(), 2).as_deref(),
            Some("Budi")
        );
        assert_eq!(first_employee_name(&RawTable::default(), 2), None);
    }

    #[test]
    fn test_render_report_every_profile() {
        let raw = RawTable::from_strs([
            vec!["Issue Key", "Summary", "Status", "Hours"],
            vec!["ABC-1", "Fix login", "Done", "2"],
        ]);
        for kind in [ProfileKind::Generic, ProfileKind::Jira] {
            let profile = ReportProfile::new(kind);
            let prepared = prepare(&raw, &profile).unwrap();
            let report =
                render_report(&prepared, &profile, &profile.default_config(), printed_at()).unwrap();
            assert!(report.bytes.starts_with(b"%PDF-"));
            assert_eq!(report.page_count, 1);
        }

        let profile = ReportProfile::attendance_bps();
        let prepared = prepare(&attendance_rows(), &profile).unwrap();
        let report =
            render_report(&prepared, &profile, &profile.default_config(), printed_at()).unwrap();
        assert_eq!(report.orientation, Orientation::Landscape);
        assert_eq!(report.rows, 3);
    }
}
