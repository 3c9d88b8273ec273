//! Presentation settings for generated reports.
//!
//! [`PdfConfig`] is the record behind every field a user can fill in before
//! exporting: title, period, signatory names, orientation, font size and
//! optional signature images. Every field is optional and has a documented
//! fallback. Settings can be loaded from a JSON file and then overridden
//! field by field from the command line.
//!
//! ```json
//! {
//!   "title": "Timesheet Report",
//!   "period": "January 2025",
//!   "orientation": "landscape",
//!   "fontSize": 8,
//!   "signatories": {
//!     "employee": { "name": "Alice", "imagePath": "alice.png" },
//!     "teamLeader": { "name": "Bob" }
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{Result, SheetPdfError};

/// Page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// 210 x 297 mm.
    Portrait,
    /// 297 x 210 mm. Preferred for wide tables.
    #[default]
    Landscape,
}

impl FromStr for Orientation {
    type Err = SheetPdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "portrait" => Ok(Self::Portrait),
            "landscape" => Ok(Self::Landscape),
            _ => Err(SheetPdfError::invalid_config(format!(
                "Invalid orientation: {s}. Must be one of: portrait, landscape"
            ))),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "portrait"),
            Self::Landscape => write!(f, "landscape"),
        }
    }
}

/// Table font size in points, kept within [`FontSize::MIN`]..=[`FontSize::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f32", into = "f32")]
pub struct FontSize(f32);

impl FontSize {
    /// Smallest accepted size.
    pub const MIN: f32 = 3.0;
    /// Largest accepted size.
    pub const MAX: f32 = 14.0;
    /// Size used when none is given.
    pub const DEFAULT: f32 = 8.0;

    /// Clamp `points` into the accepted range. Non-finite input falls back
    /// to the default.
    pub fn new(points: f32) -> Self {
        if points.is_finite() {
            Self(points.clamp(Self::MIN, Self::MAX))
        } else {
            Self(Self::DEFAULT)
        }
    }

    /// Size in points.
    pub fn points(self) -> f32 {
        self.0
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl From<f32> for FontSize {
    fn from(points: f32) -> Self {
        Self::new(points)
    }
}

impl From<FontSize> for f32 {
    fn from(size: FontSize) -> Self {
        size.0
    }
}

/// Who signs a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatoryRole {
    /// The person the report is about ("Prepared by").
    Employee,
    /// Approver on timesheet reports.
    TeamLeader,
    /// Reviewer on attendance reports ("Diperiksa Oleh").
    Checker,
    /// Final approver on attendance reports ("Disetujui Oleh").
    Approver,
}

impl FromStr for SignatoryRole {
    type Err = SheetPdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], "").as_str() {
            "employee" => Ok(Self::Employee),
            "teamleader" => Ok(Self::TeamLeader),
            "checker" | "checkedby" => Ok(Self::Checker),
            "approver" | "approvedby" => Ok(Self::Approver),
            _ => Err(SheetPdfError::invalid_config(format!(
                "Unknown signatory: {s}. Must be one of: employee, team-leader, checker, approver"
            ))),
        }
    }
}

/// One signature slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signer {
    /// Printed name.
    #[serde(default)]
    pub name: Option<String>,

    /// Signature image file, resolved relative to the settings file.
    #[serde(default)]
    pub image_path: Option<PathBuf>,

    /// Encoded signature image (PNG or JPEG).
    #[serde(skip)]
    pub image: Option<Vec<u8>>,
}

impl Signer {
    /// Name if set and not blank.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().map(str::trim).filter(|n| !n.is_empty())
    }
}

/// Every signature slot a report may print.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signatories {
    /// Employee slot.
    #[serde(default)]
    pub employee: Signer,
    /// Team leader slot.
    #[serde(default)]
    pub team_leader: Signer,
    /// Checker slot.
    #[serde(default)]
    pub checker: Signer,
    /// Approver slot.
    #[serde(default)]
    pub approver: Signer,
}

impl Signatories {
    /// Slot for a role.
    pub fn get(&self, role: SignatoryRole) -> &Signer {
        match role {
            SignatoryRole::Employee => &self.employee,
            SignatoryRole::TeamLeader => &self.team_leader,
            SignatoryRole::Checker => &self.checker,
            SignatoryRole::Approver => &self.approver,
        }
    }

    /// Mutable slot for a role.
    pub fn get_mut(&mut self, role: SignatoryRole) -> &mut Signer {
        match role {
            SignatoryRole::Employee => &mut self.employee,
            SignatoryRole::TeamLeader => &mut self.team_leader,
            SignatoryRole::Checker => &mut self.checker,
            SignatoryRole::Approver => &mut self.approver,
        }
    }

    fn slots_mut(&mut self) -> [&mut Signer; 4] {
        [
            &mut self.employee,
            &mut self.team_leader,
            &mut self.checker,
            &mut self.approver,
        ]
    }
}

/// User-supplied presentation settings for one generated document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfConfig {
    /// Document title. Falls back to the report's default title.
    #[serde(default)]
    pub title: Option<String>,

    /// Reporting period, printed as `Period: ...`.
    #[serde(default)]
    pub period: Option<String>,

    /// Free-text justification appended to the attendance justification box.
    #[serde(default)]
    pub justification: Option<String>,

    /// Explicit orientation. `None` lets the report decide.
    #[serde(default)]
    pub orientation: Option<Orientation>,

    /// Table font size.
    #[serde(default)]
    pub font_size: FontSize,

    /// Signature slots.
    #[serde(default)]
    pub signatories: Signatories,
}

impl PdfConfig {
    /// Title if set and not blank.
    pub fn title(&self) -> Option<&str> {
        non_blank(self.title.as_deref())
    }

    /// Period if set and not blank.
    pub fn period(&self) -> Option<&str> {
        non_blank(self.period.as_deref())
    }

    /// Justification if set and not blank.
    pub fn justification(&self) -> Option<&str> {
        non_blank(self.justification.as_deref())
    }

    /// Parse settings from JSON text. Image paths are not loaded.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings from JSON text, taking the font size from `defaults`
    /// when the text does not set `fontSize`.
    pub fn from_json_over(json: &str, defaults: &PdfConfig) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let has_font_size = value.get("fontSize").is_some();
        let mut config: Self = serde_json::from_value(value)?;
        if !has_font_size {
            config.font_size = defaults.font_size;
        }
        Ok(config)
    }

    /// Load settings from a JSON file, reading any referenced signature
    /// images. Relative image paths resolve against the file's directory.
    /// A file without `fontSize` keeps the font size of `defaults`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or a
    /// referenced image file cannot be read.
    pub async fn load(path: &Path, defaults: &PdfConfig) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SheetPdfError::file_not_found(path.to_path_buf())
            } else {
                SheetPdfError::FileNotAccessible {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let mut config = Self::from_json_over(&text, defaults)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.load_images(base).await?;
        Ok(config)
    }

    /// Read signature images for every slot that names an image path.
    pub async fn load_images(&mut self, base: &Path) -> Result<()> {
        for signer in self.signatories.slots_mut() {
            if let Some(image_path) = &signer.image_path {
                let resolved = base.join(image_path);
                let bytes = tokio::fs::read(&resolved).await.map_err(|e| {
                    SheetPdfError::FileNotAccessible {
                        path: resolved.clone(),
                        source: e,
                    }
                })?;
                signer.image = Some(bytes);
            }
        }
        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
