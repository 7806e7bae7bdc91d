//! Normalizer: turns an uploaded wide table into long-form score records.
//!
//! Steps run in a fixed order: canonicalize headers, keep accepted type codes,
//! coerce score cells to numbers, scrub sentinels, reshape wide to long.

use serde::Serialize;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::table::RawTable;

const NO_BREAK_SPACE: char = '\u{a0}';
const BYTE_ORDER_MARK: char = '\u{feff}';

/// One (device, type, period, score) observation. `score` is never null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongRecord {
    pub device: String,
    pub type_code: String,
    pub period: String,
    pub score: f64,
}

/// Canonical form of a header: no-break spaces and the unit suffix removed,
/// surrounding whitespace trimmed.
pub fn canonical_column_name(raw: &str, unit_suffix: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != NO_BREAK_SPACE && *c != BYTE_ORDER_MARK)
        .collect();
    let cleaned = if unit_suffix.is_empty() {
        cleaned
    } else {
        cleaned.replace(unit_suffix, "")
    };
    cleaned.trim().to_string()
}

/// Parses a score cell. Anything that is not a finite number becomes `None`.
pub fn coerce_score(cell: &str) -> Option<f64> {
    cell.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Reshapes `raw` into long-form records.
///
/// # Errors
///
/// Returns [`PipelineError::MissingColumn`] when the type or device column is
/// absent. Unaccepted type codes, non-numeric cells and sentinel values are
/// dropped silently.
pub fn normalize(raw: &RawTable, config: &PipelineConfig) -> Result<Vec<LongRecord>> {
    let headers: Vec<String> = raw
        .headers
        .iter()
        .map(|h| canonical_column_name(h, &config.unit_suffix))
        .collect();

    let locate = |column: &str| {
        headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| PipelineError::MissingColumn {
                column: column.to_string(),
                path: raw.origin.clone(),
            })
    };
    let type_idx = locate(&config.type_column)?;
    let device_idx = locate(&config.device_column)?;

    let score_columns: Vec<(usize, &str)> = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| !config.is_identity_column(h))
        .map(|(i, h)| (i, h.as_str()))
        .collect();

    let mut records = Vec::new();
    let mut kept_rows = 0usize;

    for row in 0..raw.rows.len() {
        let type_code = raw.cell(row, type_idx).trim();
        if !config.is_accepted_type(type_code) {
            continue;
        }
        let device = raw.cell(row, device_idx);
        if device.trim().is_empty() {
            continue;
        }
        kept_rows += 1;

        for &(col, period) in &score_columns {
            let Some(score) = coerce_score(raw.cell(row, col)) else {
                continue;
            };
            if config.is_sentinel(score) {
                continue;
            }
            records.push(LongRecord {
                device: device.to_string(),
                type_code: type_code.to_string(),
                period: period.to_string(),
                score,
            });
        }
    }

    debug!(
        origin = %raw.origin.display(),
        total_rows = raw.rows.len(),
        kept_rows,
        score_columns = score_columns.len(),
        records = records.len(),
        "Upload normalized"
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            "test.csv",
            headers.iter().map(|s| s.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    #[test]
    fn test_canonical_column_name_variants_agree() {
        let a = canonical_column_name("02 [%]", "[%]");
        let b = canonical_column_name(" 02\u{a0}", "[%]");
        let c = canonical_column_name("02[%] ", "[%]");
        assert_eq!(a, "02");
        assert_eq!(a, b);
        assert_eq!(a, c);
    }

    #[test]
    fn test_canonical_column_name_identity_header() {
        assert_eq!(canonical_column_name("\u{feff}Gerät ", "[%]"), "Gerät");
        assert_eq!(canonical_column_name("Typ\u{a0}", "[%]"), "Typ");
    }

    #[test]
    fn test_coerce_score() {
        assert_eq!(coerce_score("85"), Some(85.0));
        assert_eq!(coerce_score(" 91.5 "), Some(91.5));
        assert_eq!(coerce_score("n/a"), None);
        assert_eq!(coerce_score(""), None);
        assert_eq!(coerce_score("NaN"), None);
        assert_eq!(coerce_score("inf"), None);
    }

    #[test]
    fn test_only_valid_cell_survives() {
        let raw = table(
            &["Gerät", "Typ", "01", "02 [%]", "03", "04"],
            &[&["Dev1", "FV", "85", "0", "-102", "n/a"]],
        );
        let records = normalize(&raw, &PipelineConfig::default()).unwrap();
        assert_eq!(
            records,
            vec![LongRecord {
                device: "Dev1".to_string(),
                type_code: "FV".to_string(),
                period: "01".to_string(),
                score: 85.0,
            }]
        );
    }

    #[test]
    fn test_unaccepted_types_dropped() {
        let raw = table(
            &["Gerät", "Typ", "01"],
            &[
                &["Dev1", "FV", "80"],
                &["Dev2", "XX", "90"],
                &["Dev3", "", "95"],
                &["Dev4", "LA", "70"],
                &["Dev5", "RA", "60"],
            ],
        );
        let records = normalize(&raw, &PipelineConfig::default()).unwrap();
        let devices: Vec<_> = records.iter().map(|r| r.device.as_str()).collect();
        assert_eq!(devices, vec!["Dev1", "Dev4", "Dev5"]);
        assert!(records
            .iter()
            .all(|r| ["FV", "LA", "RA"].contains(&r.type_code.as_str())));
    }

    #[test]
    fn test_no_accepted_rows_is_empty() {
        let raw = table(&["Gerät", "Typ", "01"], &[&["Dev1", "QQ", "88"]]);
        let records = normalize(&raw, &PipelineConfig::default()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_missing_type_column_is_schema_error() {
        let raw = table(&["Gerät", "01"], &[&["Dev1", "88"]]);
        let err = normalize(&raw, &PipelineConfig::default()).unwrap_err();
        match err {
            PipelineError::MissingColumn { column, .. } => assert_eq!(column, "Typ"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_device_column_is_schema_error() {
        let raw = table(&["Typ", "01"], &[&["FV", "88"]]);
        let err = normalize(&raw, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, PipelineError::MissingColumn { .. }));
    }

    #[test]
    fn test_type_header_with_stray_spaces_found() {
        let raw = table(&["Gerät\u{a0}", " Typ ", "01 [%]"], &[&["Dev1", "FV", "77"]]);
        let records = normalize(&raw, &PipelineConfig::default()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period, "01");
    }

    #[test]
    fn test_extra_identity_column_not_scored() {
        let raw = table(
            &["Gerät", "Seriennummer", "Typ", "01"],
            &[&["Dev1", "12345", "FV", "90"]],
        );
        let config = PipelineConfig::default().with_identity_columns(["Seriennummer"]);
        let records = normalize(&raw, &config).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].period, "01");

        let unconfigured = normalize(&raw, &PipelineConfig::default()).unwrap();
        assert_eq!(unconfigured.len(), 2);
    }

    #[test]
    fn test_no_null_or_sentinel_scores() {
        let raw = table(
            &["Gerät", "Typ", "01", "02", "03"],
            &[
                &["Dev1", "FV", "0", "", "-102"],
                &["Dev2", "LA", "55", "abc", "0.0"],
            ],
        );
        let config = PipelineConfig::default();
        let records = normalize(&raw, &config).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records.iter().all(|r| !config.is_sentinel(r.score)));
    }
}
