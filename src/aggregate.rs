use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::normalizer::LongRecord;
use crate::stats::{mean, percentile};

/// Per-(device, type) statistics for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    #[serde(rename = "Gerät")]
    pub device: String,
    #[serde(rename = "Typ")]
    pub type_code: String,
    #[serde(rename = "Average_Score")]
    pub average_score: f64,
    #[serde(rename = "P90")]
    pub p90: f64,
}

/// Groups long-form records by (device, type) and computes the mean and the
/// interpolated 90th percentile of each group.
///
/// Output is ordered by device, then type, one row per observed pair.
pub fn aggregate(records: &[LongRecord]) -> Vec<SummaryRecord> {
    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();

    for record in records {
        groups
            .entry((record.device.as_str(), record.type_code.as_str()))
            .or_default()
            .push(record.score);
    }

    groups
        .into_iter()
        .filter_map(|((device, type_code), scores)| {
            Some(SummaryRecord {
                device: device.to_string(),
                type_code: type_code.to_string(),
                average_score: mean(&scores)?,
                p90: percentile(&scores, 90.0)?,
            })
        })
        .collect()
}
