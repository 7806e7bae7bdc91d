//! Pipeline configuration: column names, accepted type codes, sentinels and
//! artifact naming.

use crate::normalizer::canonical_column_name;

/// Column holding the device name.
pub const DEVICE_COLUMN: &str = "Gerät";
/// Column holding the type code.
pub const TYPE_COLUMN: &str = "Typ";
/// Summary column with the per-group mean.
pub const AVERAGE_COLUMN: &str = "Average_Score";
/// Summary column with the per-group 90th percentile.
pub const P90_COLUMN: &str = "P90";

/// Reading code the measurement system writes for an invalid measurement.
pub const INVALID_READING: f64 = -102.0;

/// Tunables for normalizing uploads and naming summary artifacts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub device_column: String,
    pub type_column: String,
    /// Free-form identity columns that must not be treated as scores.
    pub extra_identity_columns: Vec<String>,
    pub accepted_types: Vec<String>,
    /// Score values meaning "no valid reading".
    pub sentinels: Vec<f64>,
    /// Unit marker stripped from score headers, e.g. `"02 [%]"`.
    pub unit_suffix: String,
    pub artifact_suffix: String,
    pub artifact_extension: String,
    pub delimiter: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device_column: DEVICE_COLUMN.to_string(),
            type_column: TYPE_COLUMN.to_string(),
            extra_identity_columns: Vec::new(),
            accepted_types: vec!["FV".into(), "LA".into(), "RA".into()],
            sentinels: vec![0.0, INVALID_READING],
            unit_suffix: "[%]".to_string(),
            artifact_suffix: "_summary".to_string(),
            artifact_extension: "csv".to_string(),
            delimiter: b',',
        }
    }
}

impl PipelineConfig {
    /// Adds free-form identity columns, canonicalized the same way as
    /// upload headers.
    pub fn with_identity_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let canonical: Vec<String> = columns
            .into_iter()
            .map(|c| canonical_column_name(c.as_ref(), &self.unit_suffix))
            .collect();
        self.extra_identity_columns.extend(canonical);
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// True when `column` is part of the fixed identity set; every other
    /// column is a numeric-coercible score column.
    pub fn is_identity_column(&self, column: &str) -> bool {
        column == self.device_column
            || column == self.type_column
            || self.extra_identity_columns.iter().any(|c| c == column)
    }

    pub fn is_accepted_type(&self, code: &str) -> bool {
        let code = code.trim();
        self.accepted_types.iter().any(|t| t == code)
    }

    pub fn is_sentinel(&self, value: f64) -> bool {
        self.sentinels.iter().any(|s| *s == value)
    }

    /// Full trailing marker of an artifact name, e.g. `"_summary.csv"`.
    pub fn artifact_tail(&self) -> String {
        format!("{}.{}", self.artifact_suffix, self.artifact_extension)
    }

    /// Artifact name for an uploaded file's base name.
    pub fn artifact_name(&self, source_stem: &str) -> String {
        artifact_name(source_stem, &self.artifact_tail())
    }
}

/// Joins an upload's base name and the artifact tail.
pub fn artifact_name(source_stem: &str, tail: &str) -> String {
    format!("{source_stem}{tail}")
}
