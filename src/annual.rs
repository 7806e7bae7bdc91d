//! Annual Reducer: merges every monthly summary artifact into one wide table.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::DEVICE_COLUMN;
use crate::error::Result;
use crate::store::SummaryStore;

/// One device's mean score per month column; `None` where the device has no
/// data for that month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRow {
    pub device: String,
    pub values: Vec<Option<f64>>,
}

/// Devices by month. Columns follow sorted artifact-name order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnualTable {
    pub months: Vec<String>,
    pub rows: Vec<AnnualRow>,
}

impl AnnualTable {
    /// True when no artifact qualified ("no data yet").
    pub fn is_empty(&self) -> bool {
        self.months.is_empty()
    }

    /// Header row: the device column followed by the month labels.
    pub fn headers(&self) -> Vec<&str> {
        std::iter::once(DEVICE_COLUMN)
            .chain(self.months.iter().map(String::as_str))
            .collect()
    }

    pub fn value(&self, device: &str, month: &str) -> Option<f64> {
        let col = self.months.iter().position(|m| m == month)?;
        self.rows
            .iter()
            .find(|r| r.device == device)
            .and_then(|r| r.values[col])
    }
}

/// Derives a column label from an artifact name.
///
/// `"2024.01_summary.csv"` becomes `"01.2024"`. A name that does not split on
/// `.` into exactly two parts is used verbatim (`"Q1_summary.csv"` -> `"Q1"`).
pub fn month_label(artifact: &str, tail: &str) -> String {
    let name_part = artifact.strip_suffix(tail).unwrap_or(artifact);
    let parts: Vec<&str> = name_part.split('.').collect();
    match parts.as_slice() {
        [year, month] => format!("{month}.{year}"),
        _ => name_part.to_string(),
    }
}

/// Rebuilds the annual table from every artifact in `store`.
///
/// Artifacts that cannot be loaded are logged and skipped.
///
/// # Errors
///
/// Only fails when the store cannot enumerate its artifacts.
#[tracing::instrument(skip(store))]
pub fn reduce<S: SummaryStore + ?Sized>(store: &S) -> Result<AnnualTable> {
    let mut artifacts = store.list_artifacts()?;
    artifacts.sort();

    let mut months: Vec<(String, BTreeMap<String, Option<f64>>)> = Vec::new();

    for artifact in &artifacts {
        let label = month_label(artifact, store.artifact_tail());

        let rows = match store.load_averages(artifact) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(artifact = %artifact, error = %e, "Skipping summary artifact");
                continue;
            }
        };

        // Blank averages are ignored; a device with none left maps to `None`.
        let mut per_device: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for row in &rows {
            let entry = per_device.entry(row.device.as_str()).or_insert((0.0, 0));
            if let Some(avg) = row.average_score {
                entry.0 += avg;
                entry.1 += 1;
            }
        }
        let averages: BTreeMap<String, Option<f64>> = per_device
            .into_iter()
            .map(|(device, (sum, n))| (device.to_string(), (n > 0).then(|| sum / n as f64)))
            .collect();

        debug!(artifact = %artifact, label = %label, devices = averages.len(), "Month merged");
        months.push((label, averages));
    }

    let devices: BTreeSet<&str> = months
        .iter()
        .flat_map(|(_, averages)| averages.keys().map(String::as_str))
        .collect();

    let rows = devices
        .into_iter()
        .map(|device| AnnualRow {
            device: device.to_string(),
            values: months
                .iter()
                .map(|(_, averages)| averages.get(device).copied().flatten())
                .collect(),
        })
        .collect::<Vec<_>>();

    info!(
        artifacts = artifacts.len(),
        months = months.len(),
        devices = rows.len(),
        "Annual table rebuilt"
    );

    Ok(AnnualTable {
        months: months.into_iter().map(|(label, _)| label).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::SummaryRecord;
    use crate::store::MemoryStore;

    const TAIL: &str = "_summary.csv";

    fn rec(device: &str, type_code: &str, avg: f64) -> SummaryRecord {
        SummaryRecord {
            device: device.to_string(),
            type_code: type_code.to_string(),
            average_score: avg,
            p90: avg,
        }
    }

    #[test]
    fn test_month_label_year_month() {
        assert_eq!(month_label("2024.01_summary.csv", TAIL), "01.2024");
    }

    #[test]
    fn test_month_label_fallbacks() {
        assert_eq!(month_label("Q1_summary.csv", TAIL), "Q1");
        assert_eq!(month_label("2024.01.05_summary.csv", TAIL), "2024.01.05");
        assert_eq!(month_label("März 2024_summary.csv", TAIL), "März 2024");
    }

    #[test]
    fn test_reduce_empty_store() {
        let table = reduce(&MemoryStore::default()).unwrap();
        assert!(table.is_empty());
        assert!(table.rows.is_empty());
        assert_eq!(table.headers(), vec!["Gerät"]);
    }

    #[test]
    fn test_reduce_orders_columns_by_artifact_name() {
        let mut store = MemoryStore::default();
        store.save("2024.02", &[rec("Dev1", "FV", 80.0)]).unwrap();
        store.save("2024.01", &[rec("Dev1", "FV", 90.0)]).unwrap();

        let table = reduce(&store).unwrap();
        assert_eq!(table.headers(), vec!["Gerät", "01.2024", "02.2024"]);
        assert_eq!(table.value("Dev1", "01.2024"), Some(90.0));
        assert_eq!(table.value("Dev1", "02.2024"), Some(80.0));
    }

    #[test]
    fn test_reduce_averages_over_types() {
        let mut store = MemoryStore::default();
        store
            .save("2024.01", &[rec("Dev1", "FV", 80.0), rec("Dev1", "LA", 90.0)])
            .unwrap();

        let table = reduce(&store).unwrap();
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.value("Dev1", "01.2024"), Some(85.0));
    }

    #[test]
    fn test_reduce_outer_merge_fills_nulls() {
        let mut store = MemoryStore::default();
        store.save("2024.01", &[rec("Dev1", "FV", 80.0)]).unwrap();
        store.save("2024.02", &[rec("Dev2", "RA", 70.0)]).unwrap();

        let table = reduce(&store).unwrap();
        assert_eq!(
            table.rows,
            vec![
                AnnualRow {
                    device: "Dev1".to_string(),
                    values: vec![Some(80.0), None],
                },
                AnnualRow {
                    device: "Dev2".to_string(),
                    values: vec![None, Some(70.0)],
                },
            ]
        );
    }

    #[test]
    fn test_reduce_skips_artifact_without_average() {
        let mut store = MemoryStore::default();
        store.save("2024.01", &[rec("Dev1", "FV", 80.0)]).unwrap();
        store.insert_raw("2024.02_summary.csv", "Gerät,Typ,P90\nDev1,FV,99\n");

        let table = reduce(&store).unwrap();
        assert_eq!(table.months, vec!["01.2024"]);
    }

    #[test]
    fn test_reduce_reads_artifact_with_only_device_and_average() {
        let mut store = MemoryStore::default();
        store.insert_raw("2024.01_summary.csv", "Gerät,Average_Score\nDev1,88\n");

        let table = reduce(&store).unwrap();
        assert_eq!(table.months, vec!["01.2024"]);
        assert_eq!(table.value("Dev1", "01.2024"), Some(88.0));
    }

    #[test]
    fn test_reduce_ignores_blank_averages() {
        let mut store = MemoryStore::default();
        store.insert_raw(
            "2024.01_summary.csv",
            "Gerät,Typ,Average_Score,P90\nDev1,FV,88,90\nDev1,LA,,\nDev2,LA,,\n",
        );

        let table = reduce(&store).unwrap();
        assert_eq!(table.months, vec!["01.2024"]);
        assert_eq!(
            table.rows,
            vec![
                AnnualRow {
                    device: "Dev1".to_string(),
                    values: vec![Some(88.0)],
                },
                AnnualRow {
                    device: "Dev2".to_string(),
                    values: vec![None],
                },
            ]
        );
    }

    #[test]
    fn test_reduce_only_bad_artifacts_is_empty() {
        let mut store = MemoryStore::default();
        store.insert_raw("2024.02_summary.csv", "Gerät,Typ\nDev1,FV\n");

        let table = reduce(&store).unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_reduce_malformed_name_uses_verbatim_label() {
        let mut store = MemoryStore::default();
        store.save("Q1", &[rec("Dev1", "FV", 75.0)]).unwrap();

        let table = reduce(&store).unwrap();
        assert_eq!(table.months, vec!["Q1"]);
        assert_eq!(table.value("Dev1", "Q1"), Some(75.0));
    }

    #[test]
    fn test_column_order_is_lexicographic_not_chronological() {
        let mut store = MemoryStore::default();
        store.save("2024.10", &[rec("Dev1", "FV", 70.0)]).unwrap();
        store.save("2024.9", &[rec("Dev1", "FV", 60.0)]).unwrap();

        let table = reduce(&store).unwrap();
        assert_eq!(table.months, vec!["10.2024", "9.2024"]);
    }
}
