//! Merge tests against real files on disk.

use clap::Parser;
use sheetpdf::SheetPdfError;
use sheetpdf::cli::{Cli, Command, MergeArgs};
use sheetpdf::commands;
use sheetpdf::merge::{MergeQueue, Merger};
use sheetpdf::output::{OutputFormatter, Verbosity};
use tempfile::TempDir;

use crate::common::{page_widths, pdf_with_page_widths, write_file};

fn merge_args(args: &[String]) -> MergeArgs {
    let argv = ["sheetpdf".to_string(), "merge".to_string()]
        .into_iter()
        .chain(args.iter().cloned());
    match Cli::try_parse_from(argv).expect("Invalid test arguments").command {
        Command::Merge(args) => args,
        Command::Convert(_) => unreachable!(),
    }
}

/// `a.pdf` with pages 101 and 102, `b.pdf` with page 201.
fn two_documents(dir: &TempDir) -> (std::path::PathBuf, std::path::PathBuf) {
    (
        write_file(dir.path(), "a.pdf", pdf_with_page_widths(&[101, 102])),
        write_file(dir.path(), "b.pdf", pdf_with_page_widths(&[201])),
    )
}

#[tokio::test]
async fn test_merge_keeps_queue_order() {
    let dir = TempDir::new().unwrap();
    let (a, b) = two_documents(&dir);

    let mut queue = MergeQueue::new();
    queue.add_files(&[&a, &b]).await.unwrap();

    let result = Merger::new().merge_queue(&queue).await.unwrap();
    assert_eq!(page_widths(&result.bytes), vec![101, 102, 201]);
    assert_eq!(result.statistics.files_merged, 2);
    assert_eq!(result.statistics.total_pages, 3);
    assert_eq!(result.merged_files, vec![a, b]);
}

#[tokio::test]
async fn test_merge_reordered_queue() {
    let dir = TempDir::new().unwrap();
    let (a, b) = two_documents(&dir);

    let mut queue = MergeQueue::new();
    queue.add_files(&[&a, &b]).await.unwrap();
    assert!(queue.move_down(0));

    let result = Merger::new().merge_queue(&queue).await.unwrap();
    assert_eq!(page_widths(&result.bytes), vec![201, 101, 102]);
}

#[tokio::test]
async fn test_single_document_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (a, _) = two_documents(&dir);

    let mut queue = MergeQueue::new();
    queue.add_files(&[&a]).await.unwrap();

    let result = Merger::new().merge_queue(&queue).await;
    assert!(matches!(
        result,
        Err(SheetPdfError::NotEnoughDocuments { queued: 1 })
    ));
    assert_eq!(queue.len(), 1);
}

#[tokio::test]
async fn test_only_non_pdf_inputs_are_rejected() {
    let dir = TempDir::new().unwrap();
    let notes = write_file(dir.path(), "notes.txt", "hello");

    let mut queue = MergeQueue::new();
    let err = queue.add_files(&[&notes]).await.unwrap_err();

    assert!(err.to_string().starts_with("Please upload valid PDF files"));
    assert!(queue.is_empty());
}

#[tokio::test]
async fn test_undecodable_document_fails_merge() {
    let dir = TempDir::new().unwrap();
    let (a, _) = two_documents(&dir);
    let broken = write_file(dir.path(), "broken.pdf", b"%PDF-1.5 garbage");

    let mut queue = MergeQueue::new();
    queue.add_files(&[&a, &broken]).await.unwrap();

    let result = Merger::new().merge_queue(&queue).await;
    assert!(matches!(result, Err(SheetPdfError::MergeFailed { .. })));
}

#[tokio::test]
async fn test_merge_command_writes_output() {
    let dir = TempDir::new().unwrap();
    let (a, b) = two_documents(&dir);
    let output = dir.path().join("bundle");

    let args = merge_args(&[
        a.display().to_string(),
        b.display().to_string(),
        "--move-up".to_string(),
        "2".to_string(),
        "-o".to_string(),
        output.display().to_string(),
    ]);
    let formatter = OutputFormatter::plain(Verbosity::Quiet);
    commands::merge(&args, &formatter).await.unwrap();

    let written = std::fs::read(dir.path().join("bundle.pdf")).unwrap();
    assert_eq!(page_widths(&written), vec![201, 101, 102]);

    let err = commands::merge(&args, &formatter).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SheetPdfError>(),
        Some(SheetPdfError::OutputExists { .. })
    ));
}

#[tokio::test]
async fn test_merge_command_expands_globs() {
    let dir = TempDir::new().unwrap();
    two_documents(&dir);
    write_file(dir.path(), "c.txt", "skip me");
    let output = dir.path().join("all.pdf");

    let pattern = dir.path().join("*.pdf").display().to_string();
    let args = merge_args(&[pattern, "-o".to_string(), output.display().to_string()]);
    commands::merge(&args, &OutputFormatter::plain(Verbosity::Quiet))
        .await
        .unwrap();

    assert_eq!(page_widths(&std::fs::read(&output).unwrap()), vec![101, 102, 201]);
}
