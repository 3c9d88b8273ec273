//! Output writing.
//!
//! Writes are atomic by default: bytes go to a temporary file next to the
//! target which is then renamed over it, so a failed write never leaves a
//! truncated PDF behind. An existing output is only replaced when the
//! overwrite mode allows it.
//!
//! # Examples
//!
//! ```no_run
//! use sheetpdf::io::writer::{OutputWriter, OverwriteMode};
//! use std::path::Path;
//!
//! # async fn example(bytes: Vec<u8>) -> Result<(), Box<dyn std::error::Error>> {
//! let writer = OutputWriter::new().overwrite(OverwriteMode::Force);
//! let stats = writer.save(bytes, Path::new("report.pdf")).await?;
//! println!("Wrote {}", stats.format_file_size());
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tokio::task;

use crate::error::{Result, SheetPdfError};
use crate::utils::format_file_size;

/// What to do when the output file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverwriteMode {
    /// Fail with [`SheetPdfError::OutputExists`].
    #[default]
    NoClobber,
    /// Replace the file.
    Force,
}

/// Options for writing output files.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    /// Write to a temporary file, then rename.
    pub atomic: bool,

    /// Existing-file policy.
    pub overwrite: OverwriteMode,

    /// Buffer size for writing, in bytes.
    pub buffer_size: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            atomic: true,
            overwrite: OverwriteMode::default(),
            buffer_size: 8192,
        }
    }
}

/// Statistics about a write operation.
#[derive(Debug, Clone)]
pub struct WriteStatistics {
    /// Time taken to write the file.
    pub write_time: Duration,

    /// Size of the written file in bytes.
    pub file_size: u64,

    /// Path where the file was written.
    pub output_path: PathBuf,
}

impl WriteStatistics {
    /// Human-readable size.
    pub fn format_file_size(&self) -> String {
        format_file_size(self.file_size)
    }
}

/// Writes generated documents to disk.
#[derive(Debug, Clone, Default)]
pub struct OutputWriter {
    options: WriteOptions,
}

impl OutputWriter {
    /// Writer with default options: atomic, never overwrite.
    pub fn new() -> Self {
        Self::default()
    }

    /// Writer with custom options.
    pub fn with_options(options: WriteOptions) -> Self {
        Self { options }
    }

    /// Set the overwrite policy.
    pub fn overwrite(mut self, mode: OverwriteMode) -> Self {
        self.options.overwrite = mode;
        self
    }

    /// Write `bytes` to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file exists and the overwrite mode is [`OverwriteMode::NoClobber`]
    /// - The output directory doesn't exist or isn't writable
    /// - The write or rename fails
    pub async fn save(&self, bytes: Vec<u8>, path: &Path) -> Result<WriteStatistics> {
        if self.options.overwrite == OverwriteMode::NoClobber && self.exists(path).await {
            return Err(SheetPdfError::output_exists(path.to_path_buf()));
        }
        self.can_write(path).await?;

        let path_buf = path.to_path_buf();
        let options = self.options.clone();

        let stats = task::spawn_blocking(move || {
            let start = Instant::now();

            let write_path = if options.atomic {
                temp_path_for(&path_buf)
            } else {
                path_buf.clone()
            };

            let file = std::fs::File::create(&write_path).map_err(|e| {
                SheetPdfError::FailedToCreateOutput {
                    path: write_path.clone(),
                    source: e,
                }
            })?;

            let mut writer = std::io::BufWriter::with_capacity(options.buffer_size, file);
            writer
                .write_all(&bytes)
                .and_then(|()| writer.flush())
                .map_err(|e| SheetPdfError::FailedToWrite {
                    path: write_path.clone(),
                    source: e,
                })?;
            drop(writer);

            if options.atomic {
                std::fs::rename(&write_path, &path_buf).map_err(|e| {
                    let _ = std::fs::remove_file(&write_path);
                    SheetPdfError::FailedToWrite {
                        path: path_buf.clone(),
                        source: e,
                    }
                })?;
            }

            Ok::<_, SheetPdfError>(WriteStatistics {
                write_time: start.elapsed(),
                file_size: bytes.len() as u64,
                output_path: path_buf,
            })
        })
        .await
        .map_err(|e| SheetPdfError::other(format!("Write task failed: {e}")))??;

        log::info!(
            "Wrote {} to {}",
            stats.format_file_size(),
            stats.output_path.display()
        );
        Ok(stats)
    }

    /// Check that the parent directory exists and is writable.
    pub async fn can_write(&self, path: &Path) -> Result<()> {
        let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(());
        };

        let metadata = tokio::fs::metadata(parent).await.map_err(|_| {
            SheetPdfError::invalid_config(format!(
                "Output directory does not exist: {}",
                parent.display()
            ))
        })?;

        if metadata.permissions().readonly() {
            return Err(SheetPdfError::invalid_config(format!(
                "Output directory is not writable: {}",
                parent.display()
            )));
        }

        Ok(())
    }

    /// Whether `path` exists.
    pub async fn exists(&self, path: &Path) -> bool {
        tokio::fs::metadata(path).await.is_ok()
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
