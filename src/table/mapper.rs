//! Projection of source rows onto a fixed report schema.
//!
//! A [`FieldMapping`] names the output columns in order and the source
//! header each one is read from. Headers are matched case-insensitively
//! after trimming, so `"STATUS"`, `" status "` and `"Status"` are the same
//! column. A configured field with no matching header is not an error: it
//! renders as an empty column in every row.
//!
//! # Examples
//!
//! ```
//! use sheetpdf::table::{FieldMapping, RawTable};
//!
//! let table = RawTable::from_strs([vec!["Name", "Status"], vec!["Alice", "Done"]]);
//! let mapping = FieldMapping::from_sources(["Name", "Status", "Owner"]);
//!
//! let mapped = mapping.apply(&table, 0);
//! assert_eq!(mapped.rows, vec![vec!["Alice", "Done", ""]]);
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::RawTable;

/// Auto-generated duration codes that show up in remark columns:
/// a bare number (`"120"`, `"7.5"`) or a number with an `H:MM` suffix
/// (`"8 (8:00)"`).
static DURATION_CODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+(?:\.\d+)?(?:\s*\(\d+:\d{2}\))?$").expect("duration pattern is valid")
});

/// Whether a remark cell holds a generated duration code instead of text.
pub fn is_duration_code(value: &str) -> bool {
    DURATION_CODE.is_match(value.trim())
}

/// One output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Header text looked up in the source, matched case-insensitively.
    pub source: String,

    /// Column title in the report. Defaults to `source`.
    #[serde(default)]
    pub display: Option<String>,

    /// Blank out numeric duration codes in this column.
    #[serde(default)]
    pub remark: bool,
}

impl FieldSpec {
    /// A field displayed under its source name.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            display: None,
            remark: false,
        }
    }

    /// Set the display name.
    pub fn display_as(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Mark this field as a remark column.
    pub fn as_remark(mut self) -> Self {
        self.remark = true;
        self
    }

    /// Column title used in the report.
    pub fn display_name(&self) -> &str {
        self.display.as_deref().unwrap_or(&self.source)
    }

    fn lookup_key(&self) -> String {
        normalize_header(&self.source)
    }

    fn project(&self, cell: Option<&String>) -> String {
        match cell {
            Some(value) if self.remark && is_duration_code(value) => String::new(),
            Some(value) => value.clone(),
            None => String::new(),
        }
    }
}

fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Ordered target schema. Order fixes output column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMapping {
    fields: Vec<FieldSpec>,
}

impl FieldMapping {
    /// Build a mapping from field specs.
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Build a mapping where every field is shown under its source name.
    pub fn from_sources<I>(sources: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            fields: sources.into_iter().map(FieldSpec::new).collect(),
        }
    }

    /// Load a mapping from a JSON array of field specs.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let mapping: Self = serde_json::from_str(json)?;
        if mapping.is_empty() {
            return Err(crate::SheetPdfError::invalid_config(
                "Field mapping must name at least one column",
            ));
        }
        Ok(mapping)
    }

    /// Fields in output order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Number of output columns.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the mapping has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Display names in output order.
    pub fn display_names(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|f| f.display_name().to_string())
            .collect()
    }

    /// Position of the field with the given display name.
    pub fn position(&self, display: &str) -> Option<usize> {
        self.fields
            .iter()
            .position(|f| f.display_name().eq_ignore_ascii_case(display))
    }

    /// Resolve every field against a header row.
    ///
    /// Later duplicate headers win.
    pub fn resolve(&self, header: &[String]) -> ColumnMapping {
        let mut lookup: HashMap<String, usize> = HashMap::with_capacity(header.len());
        for (idx, cell) in header.iter().enumerate() {
            lookup.insert(normalize_header(cell), idx);
        }

        let indices = self
            .fields
            .iter()
            .map(|field| lookup.get(&field.lookup_key()).copied())
            .collect();

        ColumnMapping { indices }
    }

    /// Project a (filtered) raw table onto this schema.
    ///
    /// `header_row` is the source-format's header offset. A table without
    /// that row yields an empty result rather than an error.
    pub fn apply(&self, table: &RawTable, header_row: usize) -> MappedTable {
        let Some((header, body)) = table.split_header(header_row) else {
            log::debug!(
                "No header row at offset {header_row} ({} row(s) in source)",
                table.len()
            );
            return MappedTable {
                headers: self.display_names(),
                rows: Vec::new(),
            };
        };

        let columns = self.resolve(header);
        for field in columns.unresolved(self) {
            log::info!("Column '{}' not found in source; it will be left blank", field.source);
        }

        let rows = body
            .iter()
            .map(|row| {
                self.fields
                    .iter()
                    .zip(columns.indices())
                    .map(|(field, idx)| field.project(idx.and_then(|i| row.get(i))))
                    .collect()
            })
            .collect();

        MappedTable {
            headers: self.display_names(),
            rows,
        }
    }
}

/// Resolved source column for each field, or `None` when unmatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    indices: Vec<Option<usize>>,
}

impl ColumnMapping {
    /// Source index per field, in field order.
    pub fn indices(&self) -> &[Option<usize>] {
        &self.indices
    }

    /// Fields of `mapping` that matched no header.
    pub fn unresolved<'a>(&'a self, mapping: &'a FieldMapping) -> impl Iterator<Item = &'a FieldSpec> {
        mapping
            .fields()
            .iter()
            .zip(&self.indices)
            .filter(|(_, idx)| idx.is_none())
            .map(|(field, _)| field)
    }
}

/// Raw rows re-projected onto a field mapping's column order.
///
/// Every row has exactly as many cells as the mapping has fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedTable {
    /// Display names in field order.
    pub headers: Vec<String>,
    /// Projected data rows.
    pub rows: Vec<Vec<String>>,
}

impl MappedTable {
    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, by index.
    pub fn column(&self, idx: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(idx).map(String::as_str))
    }
}
