//! CLI argument parsing for sheetpdf.
//!
//! This module defines the command-line interface structure using `clap`.
//! Two subcommands exist: `convert` turns a spreadsheet export into a
//! report, `merge` concatenates PDFs.
//!
//! # Examples
//!
//! ```no_run
//! use sheetpdf::cli::{Cli, Command};
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! if let Command::Merge(args) = &cli.command {
//!     println!("Merging {} input(s)", args.inputs.len());
//! }
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};

use crate::config::{FontSize, Orientation, PdfConfig, SignatoryRole};
use crate::error::{Result, SheetPdfError};
use crate::io::OverwriteMode;
use crate::output::Verbosity;
use crate::profile::ProfileKind;

/// Turn timesheet and attendance exports into signed PDF reports, and
/// merge PDFs.
#[derive(Parser, Debug)]
#[command(name = "sheetpdf")]
#[command(version)]
#[command(about = "Convert spreadsheet exports to PDF reports and merge PDFs", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - show per-file details and timings
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

impl Cli {
    /// Verbosity selected by `-q`/`-v`.
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Convert a CSV or Excel export into a PDF report
    ///
    /// Examples:
    ///   sheetpdf convert worklog.csv --profile jira --title "Sprint 12"
    ///   sheetpdf convert attendance.xlsx --profile attendance-bps \
    ///       --checked-by "Rina" --signature employee=sig.png
    Convert(ConvertArgs),

    /// Merge two or more PDF files into one
    ///
    /// Files are merged in the order given; glob patterns expand in
    /// name order.
    ///
    /// Examples:
    ///   sheetpdf merge cover.pdf report.pdf -o bundle
    ///   sheetpdf merge "chapter*.pdf" --move-up 3
    Merge(MergeArgs),
}

/// Arguments of `sheetpdf convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Source file (.csv, or .xlsx/.xls for attendance profiles)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Report variant
    #[arg(short, long, value_name = "PROFILE", default_value = "generic")]
    #[arg(value_parser = parse_profile)]
    pub profile: ProfileKind,

    /// Output PDF path. Defaults to the source name with a PDF suffix,
    /// next to the source
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// JSON settings file (title, period, signatories, ...)
    ///
    /// Flags given on the command line override values from the file.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// JSON field mapping replacing the profile's columns
    ///
    /// A list of {"source": "...", "display": "...", "remark": false}.
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// CSV field delimiter
    #[arg(short, long, value_name = "CHAR")]
    #[arg(value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,

    /// Report title
    #[arg(long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Reporting period, printed under the title
    #[arg(long, value_name = "TEXT")]
    pub period: Option<String>,

    /// Employee name
    #[arg(long, value_name = "NAME")]
    pub employee: Option<String>,

    /// Team leader name
    #[arg(long, value_name = "NAME")]
    pub team_leader: Option<String>,

    /// Checker name (attendance register)
    #[arg(long, value_name = "NAME")]
    pub checked_by: Option<String>,

    /// Approver name (attendance register)
    #[arg(long, value_name = "NAME")]
    pub approved_by: Option<String>,

    /// Free-text justification added to the justification box
    #[arg(long, value_name = "TEXT")]
    pub justification: Option<String>,

    /// Page orientation. Defaults depend on the profile and column count
    #[arg(long, value_name = "ORIENTATION")]
    #[arg(value_parser = parse_orientation)]
    pub orientation: Option<Orientation>,

    /// Table font size in points (3-14)
    #[arg(long, value_name = "PT")]
    #[arg(value_parser = parse_font_size)]
    pub font_size: Option<f32>,

    /// Signature image for a signatory, as ROLE=PATH (repeatable)
    ///
    /// Roles: employee, team-leader, checker, approver.
    #[arg(long, value_name = "ROLE=PATH")]
    #[arg(value_parser = parse_signature)]
    pub signature: Vec<SignatureArg>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

impl ConvertArgs {
    /// Apply command-line overrides to `config`.
    pub fn apply_to(&self, config: &mut PdfConfig) {
        let text_overrides = [
            (&self.title, &mut config.title),
            (&self.period, &mut config.period),
            (&self.justification, &mut config.justification),
        ];
        for (value, target) in text_overrides {
            if value.is_some() {
                target.clone_from(value);
            }
        }

        let name_overrides = [
            (SignatoryRole::Employee, &self.employee),
            (SignatoryRole::TeamLeader, &self.team_leader),
            (SignatoryRole::Checker, &self.checked_by),
            (SignatoryRole::Approver, &self.approved_by),
        ];
        for (role, name) in name_overrides {
            if name.is_some() {
                config.signatories.get_mut(role).name.clone_from(name);
            }
        }

        if let Some(orientation) = self.orientation {
            config.orientation = Some(orientation);
        }
        if let Some(size) = self.font_size {
            config.font_size = FontSize::new(size);
        }
    }

    /// Overwrite policy for the output.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        overwrite_mode(self.force)
    }
}

/// Arguments of `sheetpdf merge`.
#[derive(Args, Debug)]
pub struct MergeArgs {
    /// PDF files or glob patterns, in merge order
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<String>,

    /// Output file name; ".pdf" is appended when missing
    #[arg(short, long, value_name = "NAME", default_value = crate::utils::DEFAULT_MERGED_NAME)]
    pub output: String,

    /// Move the file at this 1-based position one place up (repeatable)
    #[arg(long, value_name = "POS")]
    pub move_up: Vec<usize>,

    /// Move the file at this 1-based position one place down (repeatable)
    ///
    /// Applied after every --move-up.
    #[arg(long, value_name = "POS")]
    pub move_down: Vec<usize>,

    /// Overwrite the output file if it exists
    #[arg(short, long)]
    pub force: bool,
}

impl MergeArgs {
    /// Overwrite policy for the output.
    pub fn overwrite_mode(&self) -> OverwriteMode {
        overwrite_mode(self.force)
    }
}

fn overwrite_mode(force: bool) -> OverwriteMode {
    if force {
        OverwriteMode::Force
    } else {
        OverwriteMode::NoClobber
    }
}

/// A `ROLE=PATH` pair from `--signature`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureArg {
    /// Slot the image belongs to.
    pub role: SignatoryRole,
    /// Image file.
    pub path: PathBuf,
}

impl FromStr for SignatureArg {
    type Err = SheetPdfError;

    fn from_str(s: &str) -> Result<Self> {
        let (role, path) = s.split_once('=').ok_or_else(|| {
            SheetPdfError::invalid_config(format!("Expected ROLE=PATH, got '{s}'"))
        })?;
        if path.trim().is_empty() {
            return Err(SheetPdfError::invalid_config(format!(
                "Missing image path for '{role}'"
            )));
        }
        Ok(Self {
            role: role.parse()?,
            path: PathBuf::from(path.trim()),
        })
    }
}

fn parse_profile(s: &str) -> std::result::Result<ProfileKind, String> {
    s.parse().map_err(|e: SheetPdfError| e.to_string())
}

fn parse_orientation(s: &str) -> std::result::Result<Orientation, String> {
    s.parse().map_err(|e: SheetPdfError| e.to_string())
}

fn parse_signature(s: &str) -> std::result::Result<SignatureArg, String> {
    s.parse().map_err(|e: SheetPdfError| e.to_string())
}

fn parse_font_size(s: &str) -> std::result::Result<f32, String> {
    let size: f32 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if (FontSize::MIN..=FontSize::MAX).contains(&size) {
        Ok(size)
    } else {
        Err(format!(
            "font size must be between {} and {}",
            FontSize::MIN,
            FontSize::MAX
        ))
    }
}

fn parse_delimiter(s: &str) -> std::result::Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got '{s}'")),
    }
}
