//! Small helpers shared by the commands.

use std::path::PathBuf;

use crate::error::{Result, SheetPdfError};

/// Default name for merged output.
pub const DEFAULT_MERGED_NAME: &str = "merged_document.pdf";

/// Expand each pattern with `glob`. A pattern without glob metacharacters
/// that matches nothing is kept as a literal path, so a missing file is
/// reported by the reader rather than silently dropped.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns {
        resolved_paths.extend(collect_paths_for_pattern(pattern.as_ref())?);
    }

    Ok(resolved_paths)
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let paths = glob::glob(pattern).map_err(|err| SheetPdfError::Other {
        message: err.to_string(),
    })?;

    let mut resolved_paths = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| SheetPdfError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    if resolved_paths.is_empty() && !has_glob_chars(pattern) {
        resolved_paths.push(PathBuf::from(pattern));
    }
    resolved_paths.sort_unstable_by(|a, b| by_length_then_name(a, b));
    Ok(resolved_paths)
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn by_length_then_name(a: &std::path::Path, b: &std::path::Path) -> std::cmp::Ordering {
    a.as_os_str().len().cmp(&b.as_os_str().len()).then_with(|| a.cmp(b))
}

/// Format file size as human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}

/// Append `.pdf` unless the name already ends with it. Blank names fall
/// back to [`DEFAULT_MERGED_NAME`].
pub fn ensure_pdf_suffix(name: &str) -> String {
    let name = name.trim();
    if name.is_empty() {
        DEFAULT_MERGED_NAME.to_string()
    } else if name.to_ascii_lowercase().ends_with(".pdf") {
        name.to_string()
    } else {
        format!("{name}.pdf")
    }
}
