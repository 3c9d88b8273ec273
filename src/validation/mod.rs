//! Input validation.
//!
//! Sources and merge inputs are rejected on their extension before any
//! bytes are parsed. Merge inputs can additionally be inspected, which
//! loads the PDF and reports its page count and first page size.
//!
//! # Examples
//!
//! ```no_run
//! use sheetpdf::validation::Validator;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let info = Validator::new().inspect_pdf(Path::new("report.pdf")).await?;
//! println!("PDF has {} pages", info.page_count);
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use lopdf::{Document, Object};
use serde::Serialize;

use crate::error::{Result, SheetPdfError};
use crate::io::read_file;
use crate::profile::SourceFormat;

/// Message shown when merge inputs are not PDFs.
pub const INVALID_PDF_MESSAGE: &str = "Please upload valid PDF files";

/// Whether `path` ends in `.pdf`, ignoring case.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Reject a source whose extension `format` does not accept.
///
/// # Errors
///
/// Returns [`SheetPdfError::InvalidInputFormat`] carrying the format's
/// user-facing rejection message.
pub fn validate_source(path: &Path, format: SourceFormat) -> Result<()> {
    if format.accepts(path) {
        Ok(())
    } else {
        Err(SheetPdfError::invalid_input_format(
            path.to_path_buf(),
            format.rejection_message(),
        ))
    }
}

/// Facts about a merge input.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfInfo {
    /// Inspected file.
    pub path: PathBuf,

    /// Number of pages.
    pub page_count: usize,

    /// Header version, e.g. `"1.5"`.
    pub version: String,

    /// Size of the file in bytes.
    pub file_size: u64,

    /// First page size in points, when it carries its own media box.
    pub page_dimensions: Option<(f32, f32)>,
}

impl PdfInfo {
    fn from_document(path: PathBuf, file_size: u64, doc: &Document) -> Self {
        let pages = doc.get_pages();

        let page_dimensions = pages
            .values()
            .next()
            .and_then(|&id| doc.get_dictionary(id).ok())
            .and_then(|page| page.get(b"MediaBox").and_then(Object::as_array).ok())
            .filter(|media_box| media_box.len() >= 4)
            .and_then(|media_box| {
                let width = media_box[2].as_float().ok()?;
                let height = media_box[3].as_float().ok()?;
                Some((width, height))
            });

        Self {
            path,
            page_count: pages.len(),
            version: doc.version.clone(),
            file_size,
            page_dimensions,
        }
    }
}

/// Checks merge inputs before they are queued.
#[derive(Debug, Clone, Copy, Default)]
pub struct Validator;

impl Validator {
    /// Create a new validator.
    pub fn new() -> Self {
        Self
    }

    /// Load `path` and describe it.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The extension is not `.pdf`
    /// - The file cannot be read or is empty
    /// - The bytes are not a PDF with at least one page
    pub async fn inspect_pdf(&self, path: &Path) -> Result<PdfInfo> {
        if !has_pdf_extension(path) {
            return Err(SheetPdfError::invalid_input_format(
                path.to_path_buf(),
                INVALID_PDF_MESSAGE,
            ));
        }

        let bytes = read_file(path).await?;
        if bytes.is_empty() {
            return Err(SheetPdfError::invalid_input_format(
                path.to_path_buf(),
                "File is empty",
            ));
        }

        let doc = Document::load_mem(&bytes).map_err(|e| {
            SheetPdfError::invalid_input_format(
                path.to_path_buf(),
                format!("{INVALID_PDF_MESSAGE} ({e})"),
            )
        })?;

        let info = PdfInfo::from_document(path.to_path_buf(), bytes.len() as u64, &doc);
        if info.page_count == 0 {
            return Err(SheetPdfError::invalid_input_format(
                path.to_path_buf(),
                "PDF has no pages",
            ));
        }

        Ok(info)
    }
}
