//! Whole pipeline: file on disk, session, prepared table, layout, PDF.

use chrono::NaiveDate;
use sheetpdf::layout::{DrawOp, Page};
use sheetpdf::profile::ReportProfile;
use sheetpdf::report;
use sheetpdf::session::Session;
use sheetpdf::table::{FieldMapping, FieldSpec};
use tempfile::TempDir;

use crate::common::{page_texts, worklog_csv, write_file};

fn text_y(page: &Page, needle: &str) -> Option<f32> {
    page.ops().iter().find_map(|op| match op {
        DrawOp::Text { text, y, .. } if text == needle => Some(*y),
        _ => None,
    })
}

fn printed_at() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 31)
        .unwrap()
        .and_hms_opt(17, 0, 0)
        .unwrap()
}

#[tokio::test]
async fn test_blank_rows_filtered_then_mapped() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "team.csv", "Name,Status\nAlice,Done\n,\n");

    let mut profile = ReportProfile::generic();
    profile.mapping = Some(FieldMapping::new(vec![
        FieldSpec::new("Name"),
        FieldSpec::new("Status"),
        FieldSpec::new("Owner"),
    ]));

    let mut session = Session::new(profile);
    session.load_source(&input).await.unwrap();
    let source = session.source().unwrap();
    assert_eq!(source.table.len(), 3);

    let prepared = report::prepare(&source.table, session.profile()).unwrap();
    assert_eq!(prepared.table.headers, vec!["Name", "Status", "Owner"]);
    assert_eq!(prepared.table.rows, vec![vec!["Alice", "Done", ""]]);

    let exported = session.export_at(printed_at()).await.unwrap();
    assert_eq!(exported.report.rows, 1);
    assert_eq!(exported.output_name, "team.pdf");

    let texts = page_texts(&exported.report.bytes).concat();
    assert!(texts.contains(&"Owner".to_string()));
    assert!(texts.contains(&"Alice".to_string()));
}

#[tokio::test]
async fn test_signature_block_follows_short_table() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "short.csv", worklog_csv(2));

    let mut session = Session::new(ReportProfile::generic());
    session.load_source(&input).await.unwrap();
    let source = session.source().unwrap();

    let prepared = report::prepare(&source.table, session.profile()).unwrap();
    let layout = report::compose(&prepared, session.profile(), session.config(), printed_at());

    let page = layout.page(0).unwrap();
    let height = layout.size().height;
    let last_cell = text_y(page, "ABC-2").unwrap();
    let caption = text_y(page, "Prepared by:").unwrap();

    assert!(caption > last_cell);
    assert!(caption < height - 50.0);
    assert_eq!(text_y(page, "Approved by:"), Some(caption));
}

#[tokio::test]
async fn test_signature_block_clamped_on_long_table() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "long.csv", worklog_csv(120));

    let mut session = Session::new(ReportProfile::generic());
    session.load_source(&input).await.unwrap();
    let source = session.source().unwrap();

    let prepared = report::prepare(&source.table, session.profile()).unwrap();
    let layout = report::compose(&prepared, session.profile(), session.config(), printed_at());
    let height = layout.size().height;

    let (last, earlier) = layout.pages().split_last().unwrap();
    assert!(!earlier.is_empty());
    assert!(earlier.iter().all(|page| !page.has_text("Prepared by:")));

    let caption = text_y(last, "Prepared by:").unwrap();
    assert!(caption <= height - 50.0);
}

#[tokio::test]
async fn test_register_signatures_pinned_to_bottom() {
    let profile = ReportProfile::attendance_bps();
    let raw = sheetpdf::table::RawTable::from_strs([
        vec!["Attendance export"],
        vec![""],
        vec![
            "No.", "Emp No.", "Employee", "Dept", "Shift", "Date", "Shift Name", "Shift In",
            "Shift Out", "Actual In", "Actual Out", "Remark",
        ],
        vec![
            "1", "E01", "Budi", "IT", "D", "2025-01-06", "Day", "08:00", "17:00", "08:05",
            "17:02", "WFH",
        ],
    ]);

    let prepared = report::prepare(&raw, &profile).unwrap();
    assert_eq!(prepared.justifications, vec!["2025-01-06: WFH"]);

    let layout = report::compose(&prepared, &profile, &profile.default_config(), printed_at());
    let page = layout.page(layout.last_page_index()).unwrap();

    assert_eq!(
        text_y(page, "Tanda Tangan Pegawai,"),
        Some(layout.size().height - 40.0)
    );
    assert!(page.has_text("( EMPLOYEE NAME )"));
}
