use std::io::{Read, Write};

use csv::{ReaderBuilder, WriterBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::aggregate::SummaryRecord;
use crate::config::{AVERAGE_COLUMN, DEVICE_COLUMN, P90_COLUMN, TYPE_COLUMN};
use crate::error::{PipelineError, Result};

/// Writes a summary table as CSV. The header row is written even when
/// `summary` is empty.
pub fn write_summary<W: Write>(writer: W, summary: &[SummaryRecord]) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record([DEVICE_COLUMN, TYPE_COLUMN, AVERAGE_COLUMN, P90_COLUMN])?;
    for record in summary {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}

/// The two columns the annual roll-up needs from a summary artifact.
/// Other columns are ignored and a blank average reads as `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeviceAverage {
    #[serde(rename = "Gerät")]
    pub device: String,
    #[serde(rename = "Average_Score")]
    pub average_score: Option<f64>,
}

/// Reads a summary table written by [`write_summary`].
pub fn read_summary<R: Read>(reader: R, name: &str) -> Result<Vec<SummaryRecord>> {
    read_rows(reader, name)
}

/// Reads only the device and average columns of a summary artifact.
pub fn read_device_averages<R: Read>(reader: R, name: &str) -> Result<Vec<DeviceAverage>> {
    read_rows(reader, name)
}

fn read_rows<R: Read, T: DeserializeOwned>(reader: R, name: &str) -> Result<Vec<T>> {
    let corrupt = |reason: String| PipelineError::CorruptArtifact {
        name: name.to_string(),
        reason,
    };

    let mut rdr = ReaderBuilder::new().from_reader(reader);
    let headers = rdr.headers().map_err(|e| corrupt(e.to_string()))?;

    for required in [DEVICE_COLUMN, AVERAGE_COLUMN] {
        if !headers.iter().any(|h| h == required) {
            return Err(corrupt(format!("no {required} column")));
        }
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let record: T = result.map_err(|e| corrupt(e.to_string()))?;
        rows.push(record);
    }

    Ok(rows)
}
