//! Named report variants.
//!
//! Every supported conversion is one [`ReportProfile`] value: where the
//! header row sits in the source, which columns to keep, how the page is
//! laid out and how the output file is named. The pipeline itself is the
//! same for all of them.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::{FontSize, Orientation, PdfConfig};
use crate::error::{Result, SheetPdfError};
use crate::layout::LayoutPolicy;
use crate::table::{FieldMapping, FieldSpec};

/// Header row of CSV exports.
pub const CSV_HEADER_ROW: usize = 0;

/// Header row of attendance workbook exports. Two banner rows precede it
/// and data starts on the row after.
pub const ATTENDANCE_HEADER_ROW: usize = 2;

/// Column count above which unmapped reports switch to landscape.
pub const WIDE_TABLE_COLUMNS: usize = 8;

/// Input file family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Comma separated text.
    Csv,
    /// Excel workbook, first sheet.
    Workbook,
}

impl SourceFormat {
    /// Accepted file extensions, lowercase, without the dot.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Csv => &["csv"],
            Self::Workbook => &["xlsx", "xls"],
        }
    }

    /// Message shown when a file with another extension is chosen.
    pub fn rejection_message(self) -> &'static str {
        match self {
            Self::Csv => "Please upload a valid CSV file",
            Self::Workbook => "Please upload a valid Excel file (.xlsx or .xls)",
        }
    }

    /// Message shown when a source has too few rows to hold any data.
    pub fn empty_message(self) -> &'static str {
        match self {
            Self::Csv => "CSV file is empty",
            Self::Workbook => "Excel file appears to be empty or invalid",
        }
    }

    /// Whether `path` has one of the accepted extensions.
    pub fn accepts(self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|accepted| ext.eq_ignore_ascii_case(accepted))
            })
    }
}

/// Which report variant to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProfileKind {
    /// Any CSV, printed with its own columns.
    #[default]
    Generic,
    /// Issue-tracker worklog CSV projected onto a fixed column set.
    Jira,
    /// Attendance workbook printed with its own columns.
    Attendance,
    /// Attendance workbook in the signed register format.
    AttendanceBps,
}

impl ProfileKind {
    /// Every variant, in help order.
    pub const ALL: [ProfileKind; 4] = [
        Self::Generic,
        Self::Jira,
        Self::Attendance,
        Self::AttendanceBps,
    ];
}

impl FromStr for ProfileKind {
    type Err = SheetPdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "generic" | "csv" => Ok(Self::Generic),
            "jira" => Ok(Self::Jira),
            "attendance" => Ok(Self::Attendance),
            "attendance-bps" | "bps" => Ok(Self::AttendanceBps),
            _ => Err(SheetPdfError::invalid_config(format!(
                "Unknown profile: {s}. Must be one of: generic, jira, attendance, attendance-bps"
            ))),
        }
    }
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Jira => write!(f, "jira"),
            Self::Attendance => write!(f, "attendance"),
            Self::AttendanceBps => write!(f, "attendance-bps"),
        }
    }
}

/// Display names of the columns justification lines are built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JustificationColumns {
    /// Column holding the date.
    pub date: &'static str,
    /// Column holding the remark.
    pub remark: &'static str,
}

/// Complete configuration of one report variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportProfile {
    /// Variant name.
    pub kind: ProfileKind,
    /// Accepted input family.
    pub format: SourceFormat,
    /// Row index of the header in the source.
    pub header_row: usize,
    /// Fewest source rows a usable file has.
    pub min_rows: usize,
    /// Column projection. `None` prints the source columns as they are.
    pub mapping: Option<FieldMapping>,
    /// Page and table layout.
    pub layout: LayoutPolicy,
    /// Orientation when the user picks none.
    pub default_orientation: Orientation,
    /// Font size the settings reset to.
    pub default_font_size: f32,
    /// Suffix replacing the source extension in the output name.
    pub output_suffix: &'static str,
    /// Output name when the source name gives nothing usable.
    pub fallback_output: &'static str,
    /// Name the output after the title when one is set.
    pub title_names_output: bool,
    /// Columns feeding the justification box.
    pub justification: Option<JustificationColumns>,
    /// Whether the source carries attendance statistics columns.
    pub attendance_source: bool,
}

impl ReportProfile {
    /// Configuration for a variant.
    pub fn new(kind: ProfileKind) -> Self {
        match kind {
            ProfileKind::Generic => Self::generic(),
            ProfileKind::Jira => Self::jira(),
            ProfileKind::Attendance => Self::attendance(),
            ProfileKind::AttendanceBps => Self::attendance_bps(),
        }
    }

    /// Plain CSV timesheet.
    pub fn generic() -> Self {
        Self {
            kind: ProfileKind::Generic,
            format: SourceFormat::Csv,
            header_row: CSV_HEADER_ROW,
            min_rows: 1,
            mapping: None,
            layout: LayoutPolicy::timesheet("Timesheet Report"),
            default_orientation: Orientation::Landscape,
            default_font_size: FontSize::DEFAULT,
            output_suffix: ".pdf",
            fallback_output: "timesheet.pdf",
            title_names_output: false,
            justification: None,
            attendance_source: false,
        }
    }

    /// Issue-tracker worklog export.
    pub fn jira() -> Self {
        let mapping = FieldMapping::new(vec![
            FieldSpec::new("Issue Key").display_as("Key"),
            FieldSpec::new("Summary"),
            FieldSpec::new("Status"),
            FieldSpec::new("Assignee"),
            FieldSpec::new("Work Date").display_as("Date"),
            FieldSpec::new("Hours"),
            FieldSpec::new("Remark").as_remark(),
        ]);

        Self {
            kind: ProfileKind::Jira,
            mapping: Some(mapping),
            layout: LayoutPolicy::timesheet("Timesheet Report"),
            default_orientation: Orientation::Portrait,
            fallback_output: "jira_timesheet.pdf",
            title_names_output: true,
            ..Self::generic()
        }
    }

    /// Attendance workbook with its own columns.
    pub fn attendance() -> Self {
        Self {
            kind: ProfileKind::Attendance,
            format: SourceFormat::Workbook,
            header_row: ATTENDANCE_HEADER_ROW,
            min_rows: ATTENDANCE_HEADER_ROW + 2,
            mapping: None,
            layout: LayoutPolicy::timesheet("Attendance Report"),
            default_orientation: Orientation::Portrait,
            default_font_size: FontSize::DEFAULT,
            output_suffix: ".pdf",
            fallback_output: "attendance.pdf",
            title_names_output: false,
            justification: None,
            attendance_source: true,
        }
    }

    /// Signed attendance register.
    pub fn attendance_bps() -> Self {
        let mapping = FieldMapping::new(vec![
            FieldSpec::new("No."),
            FieldSpec::new("Emp No."),
            FieldSpec::new("Employee"),
            FieldSpec::new("Date"),
            FieldSpec::new("Shift Name"),
            FieldSpec::new("Shift In"),
            FieldSpec::new("Shift Out"),
            FieldSpec::new("Actual In"),
            FieldSpec::new("Actual Out"),
            FieldSpec::new("Remark").as_remark(),
        ]);

        Self {
            kind: ProfileKind::AttendanceBps,
            mapping: Some(mapping),
            layout: LayoutPolicy::attendance_register(),
            default_orientation: Orientation::Landscape,
            default_font_size: 7.0,
            output_suffix: "_BPS_Format.pdf",
            fallback_output: "attendance_BPS_Format.pdf",
            justification: Some(JustificationColumns {
                date: "Date",
                remark: "Remark",
            }),
            ..Self::attendance()
        }
    }

    /// Settings this profile starts from and resets to.
    pub fn default_config(&self) -> PdfConfig {
        PdfConfig {
            font_size: FontSize::new(self.default_font_size),
            ..Default::default()
        }
    }

    /// Orientation for a table with `columns` columns.
    ///
    /// An explicit user choice always wins. Unmapped profiles go landscape
    /// when the table is wider than [`WIDE_TABLE_COLUMNS`].
    pub fn orientation(&self, config: &PdfConfig, columns: usize) -> Orientation {
        if let Some(orientation) = config.orientation {
            return orientation;
        }
        if self.mapping.is_none() && columns > WIDE_TABLE_COLUMNS {
            return Orientation::Landscape;
        }
        self.default_orientation
    }

    /// Output file name for a source named `source_name`.
    pub fn output_name(&self, source_name: &str, config: &PdfConfig) -> String {
        if self.title_names_output {
            if let Some(title) = config.title() {
                let stem: String = title
                    .chars()
                    .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
                    .collect();
                return format!("{stem}.pdf");
            }
        }

        let file_name = Path::new(source_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("");
        let stem = self
            .format
            .extensions()
            .iter()
            .find_map(|ext| {
                let start = file_name.len().checked_sub(ext.len() + 1)?;
                let tail = file_name.get(start..)?;
                (tail.starts_with('.') && tail[1..].eq_ignore_ascii_case(ext))
                    .then(|| &file_name[..start])
            })
            .unwrap_or(file_name);

        if stem.is_empty() {
            self.fallback_output.to_string()
        } else {
            format!("{stem}{}", self.output_suffix)
        }
    }
}

impl Default for ReportProfile {
    fn default() -> Self {
        Self::generic()
    }
}
