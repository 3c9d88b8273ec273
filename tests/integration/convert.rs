//! Conversion tests driven through the `convert` subcommand.

use std::path::Path;

use clap::Parser;
use sheetpdf::SheetPdfError;
use sheetpdf::cli::{Cli, Command, ConvertArgs};
use sheetpdf::commands;
use sheetpdf::output::{OutputFormatter, Verbosity};
use tempfile::TempDir;

use crate::common::{page_image_counts, page_texts, signature_png, worklog_csv, write_file};

fn convert_args(args: &[&str]) -> ConvertArgs {
    let argv = ["sheetpdf", "convert"].iter().chain(args);
    match Cli::try_parse_from(argv).expect("Invalid test arguments").command {
        Command::Convert(args) => args,
        Command::Merge(_) => unreachable!(),
    }
}

fn quiet() -> OutputFormatter {
    OutputFormatter::plain(Verbosity::Quiet)
}

fn path_arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[tokio::test]
async fn test_convert_generic_csv_next_to_source() {
    let dir = TempDir::new().unwrap();
    let input = write_file(
        dir.path(),
        "week-02.csv",
        "Name,Status\nAlice,Done\n,\nBob,Open\n",
    );

    let args = convert_args(&[path_arg(&input), "--title", "Week 2", "--period", "Jan 2025"]);
    commands::convert(&args, &quiet()).await.unwrap();

    let output = dir.path().join("week-02.pdf");
    let bytes = std::fs::read(&output).unwrap();
    let texts = page_texts(&bytes);

    assert_eq!(texts.len(), 1);
    let page = &texts[0];
    assert!(page.contains(&"Week 2".to_string()));
    assert!(page.contains(&"Period: Jan 2025".to_string()));
    assert!(page.contains(&"Alice".to_string()));
    assert!(page.contains(&"Bob".to_string()));
    assert!(page.contains(&"Page 1 of 1".to_string()));
}

#[tokio::test]
async fn test_convert_with_mapping_file() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "team.csv", "NAME, status ,Extra\nAlice,Done,x\n");
    let mapping = write_file(
        dir.path(),
        "mapping.json",
        r#"[{"source": "Name"}, {"source": "Status"}, {"source": "Owner"}]"#,
    );
    let output = dir.path().join("out.pdf");

    let args = convert_args(&[
        path_arg(&input),
        "--mapping",
        path_arg(&mapping),
        "-o",
        path_arg(&output),
    ]);
    commands::convert(&args, &quiet()).await.unwrap();

    let texts = page_texts(&std::fs::read(&output).unwrap()).concat();
    assert!(texts.contains(&"Owner".to_string()));
    assert!(texts.contains(&"Done".to_string()));
    assert!(!texts.contains(&"Extra".to_string()));
}

#[tokio::test]
async fn test_signature_only_on_last_page() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "long.csv", worklog_csv(150));
    let signature = write_file(dir.path(), "sig.png", signature_png());
    let output = dir.path().join("long.pdf");

    let signature_arg = format!("employee={}", signature.display());
    let args = convert_args(&[
        path_arg(&input),
        "--employee",
        "Alice",
        "--signature",
        &signature_arg,
        "-o",
        path_arg(&output),
    ]);
    commands::convert(&args, &quiet()).await.unwrap();

    let bytes = std::fs::read(&output).unwrap();
    let images = page_image_counts(&bytes);
    let texts = page_texts(&bytes);

    assert!(images.len() > 1, "expected a multi-page report");
    let (last, earlier) = images.split_last().unwrap();
    assert_eq!(*last, 1);
    assert!(earlier.iter().all(|&count| count == 0));

    let last_texts = texts.last().unwrap();
    assert!(last_texts.contains(&"Prepared by:".to_string()));
    assert!(
        texts[..texts.len() - 1]
            .iter()
            .all(|page| !page.contains(&"Prepared by:".to_string()))
    );
}

#[tokio::test]
async fn test_undecodable_signature_still_exports() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "short.csv", worklog_csv(3));
    let signature = write_file(dir.path(), "sig.png", b"not an image at all");
    let output = dir.path().join("short.pdf");

    let signature_arg = format!("team-leader={}", signature.display());
    let args = convert_args(&[
        path_arg(&input),
        "--signature",
        &signature_arg,
        "-o",
        path_arg(&output),
    ]);
    commands::convert(&args, &quiet()).await.unwrap();

    let bytes = std::fs::read(&output).unwrap();
    assert_eq!(page_image_counts(&bytes), vec![0]);
    assert!(page_texts(&bytes)[0].contains(&"Approved by:".to_string()));
}

#[tokio::test]
async fn test_jira_output_named_after_title() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "export.csv", worklog_csv(2));

    let args = convert_args(&[path_arg(&input), "--profile", "jira", "--title", "Sprint 12"]);
    commands::convert(&args, &quiet()).await.unwrap();

    let output = dir.path().join("Sprint_12.pdf");
    let texts = page_texts(&std::fs::read(&output).unwrap()).concat();
    assert!(texts.contains(&"Key".to_string()));
    assert!(texts.contains(&"ABC-1".to_string()));
}

#[tokio::test]
async fn test_existing_output_needs_force() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "data.csv", "Name\nAlice\n");
    let output = write_file(dir.path(), "data.pdf", b"old");

    let args = convert_args(&[path_arg(&input)]);
    let err = commands::convert(&args, &quiet()).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SheetPdfError>(),
        Some(SheetPdfError::OutputExists { .. })
    ));
    assert_eq!(std::fs::read(&output).unwrap(), b"old");

    let args = convert_args(&[path_arg(&input), "--force"]);
    commands::convert(&args, &quiet()).await.unwrap();
    assert!(std::fs::read(&output).unwrap().starts_with(b"%PDF-"));
}

#[tokio::test]
async fn test_attendance_profile_rejects_csv() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "attendance.csv", "No.,Emp No.\n1,E01\n");

    let args = convert_args(&[path_arg(&input), "--profile", "attendance-bps"]);
    let err = commands::convert(&args, &quiet()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SheetPdfError>(),
        Some(SheetPdfError::InvalidInputFormat { .. })
    ));
    assert!(err.to_string().starts_with("Please upload a valid Excel file"));
}

#[tokio::test]
async fn test_corrupt_workbook_is_parse_failure() {
    let dir = TempDir::new().unwrap();
    let input = write_file(dir.path(), "attendance.xlsx", b"PK\x03\x04 truncated");

    let args = convert_args(&[path_arg(&input), "--profile", "attendance"]);
    let err = commands::convert(&args, &quiet()).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SheetPdfError>(),
        Some(SheetPdfError::ParseFailed { .. })
    ));
    assert!(!dir.path().join("attendance.pdf").exists());
}
