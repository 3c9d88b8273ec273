//! Working state of one conversion and merge session.
//!
//! A [`Session`] holds at most one loaded source, the settings applied to
//! it, the active profile and the merge queue. Every failing operation
//! leaves the state as it was, except loading, which never leaves a
//! half-loaded source behind.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use tokio::task;

use crate::config::PdfConfig;
use crate::error::{Result, SheetPdfError};
use crate::io::SourceReader;
use crate::merge::{MergeQueue, MergeResult, Merger};
use crate::profile::ReportProfile;
use crate::report::{self, AttendanceStats, RenderedReport};
use crate::table::RawTable;
use crate::validation::validate_source;

/// The source a session currently works on.
#[derive(Debug, Clone)]
pub struct LoadedSource {
    /// File it was read from.
    pub path: PathBuf,
    /// File name shown to the user.
    pub name: String,
    /// Parsed rows.
    pub table: RawTable,
    /// Size on disk in bytes.
    pub file_size: u64,
    /// Headline numbers for attendance sources.
    pub stats: Option<AttendanceStats>,
}

/// A report produced by [`Session::export`].
#[derive(Debug, Clone)]
pub struct ExportedReport {
    /// Suggested output file name.
    pub output_name: String,
    /// Encoded document and facts about it.
    pub report: RenderedReport,
}

/// Source, settings, profile and merge queue of one session.
#[derive(Debug, Clone)]
pub struct Session {
    profile: ReportProfile,
    config: PdfConfig,
    source: Option<LoadedSource>,
    queue: MergeQueue,
    reader: SourceReader,
}

impl Session {
    /// Session with the profile's default settings and nothing loaded.
    pub fn new(profile: ReportProfile) -> Self {
        Self {
            config: profile.default_config(),
            profile,
            source: None,
            queue: MergeQueue::new(),
            reader: SourceReader::new(),
        }
    }

    /// Replace the settings.
    pub fn with_config(mut self, config: PdfConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom CSV reader.
    pub fn with_reader(mut self, reader: SourceReader) -> Self {
        self.reader = reader;
        self
    }

    /// Active profile.
    pub fn profile(&self) -> &ReportProfile {
        &self.profile
    }

    /// Current settings.
    pub fn config(&self) -> &PdfConfig {
        &self.config
    }

    /// Current settings, for editing.
    pub fn config_mut(&mut self) -> &mut PdfConfig {
        &mut self.config
    }

    /// Loaded source, if any.
    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }

    /// Merge queue.
    pub fn queue(&self) -> &MergeQueue {
        &self.queue
    }

    /// Merge queue, for editing.
    pub fn queue_mut(&mut self) -> &mut MergeQueue {
        &mut self.queue
    }

    /// Validate, read and parse `path`, making it the active source.
    ///
    /// Any previously loaded source is dropped first, so a failed load
    /// leaves no source behind. Attendance sources pre-fill the employee
    /// name when the settings have none.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The extension does not match the profile (nothing else changes)
    /// - The file cannot be read or parsed
    /// - The source has fewer rows than the profile needs
    pub async fn load_source(&mut self, path: &Path) -> Result<&LoadedSource> {
        let format = self.profile.format;
        validate_source(path, format)?;

        self.source = None;
        let loaded = self.reader.load(path, format).await?;

        if loaded.table.len() < self.profile.min_rows {
            return Err(SheetPdfError::empty_source(format.empty_message()));
        }

        let stats = self
            .profile
            .attendance_source
            .then(|| AttendanceStats::from_raw(&loaded.table, self.profile.header_row))
            .flatten();

        if self.profile.attendance_source
            && self.config.signatories.employee.name().is_none()
            && let Some(name) = report::first_employee_name(&loaded.table, self.profile.header_row)
        {
            log::debug!("Employee name taken from source: {name}");
            self.config.signatories.employee.name = Some(name);
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        log::info!(
            "Loaded {} ({} row(s), {:?})",
            name,
            loaded.table.len(),
            loaded.load_time
        );

        Ok(&*self.source.insert(LoadedSource {
            path: loaded.path,
            name,
            table: loaded.table,
            file_size: loaded.file_size,
            stats,
        }))
    }

    /// Drop the source and reset the settings to the profile defaults.
    pub fn clear_source(&mut self) {
        self.source = None;
        self.config = self.profile.default_config();
    }

    /// Suggested output name for the loaded source.
    pub fn output_name(&self) -> Option<String> {
        self.source
            .as_ref()
            .map(|source| self.profile.output_name(&source.name, &self.config))
    }

    /// Build the report for the loaded source, stamped with the current
    /// local time.
    pub async fn export(&self) -> Result<ExportedReport> {
        self.export_at(chrono::Local::now().naive_local()).await
    }

    /// Build the report with a fixed print timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`SheetPdfError::NoValidData`] when nothing is loaded or
    /// every row is blank. The loaded source is kept either way.
    pub async fn export_at(&self, printed_at: NaiveDateTime) -> Result<ExportedReport> {
        let Some(source) = &self.source else {
            return Err(SheetPdfError::NoValidData);
        };

        let prepared = report::prepare(&source.table, &self.profile)?;
        let output_name = self.profile.output_name(&source.name, &self.config);

        let profile = self.profile.clone();
        let config = self.config.clone();
        let report = task::spawn_blocking(move || {
            report::render_report(&prepared, &profile, &config, printed_at)
        })
        .await
        .map_err(|e| SheetPdfError::other(format!("Render task failed: {e}")))??;

        log::info!(
            "Rendered {} row(s) on {} page(s) as {}",
            report.rows,
            report.page_count,
            output_name
        );

        Ok(ExportedReport {
            output_name,
            report,
        })
    }

    /// Merge the queued documents in queue order.
    ///
    /// # Errors
    ///
    /// Returns [`SheetPdfError::NotEnoughDocuments`] for fewer than two
    /// entries, without reading any file. The queue is never modified.
    pub async fn merge(&self) -> Result<MergeResult> {
        Merger::new().merge_queue(&self.queue).await
    }

    /// Empty the merge queue.
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }
}
