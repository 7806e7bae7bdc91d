//! Output formatting and persistence for the annual table.
//!
//! Supports a highlighted console view, JSON, and CSV export.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use serde::Serialize;
use tracing::{debug, info};

use crate::annual::AnnualTable;
use crate::highlight::highlight;

/// Annual table plus the time it was built, for JSON output.
#[derive(Debug, Serialize)]
pub struct AnnualReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub table: &'a AnnualTable,
}

fn format_score(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Renders the table as aligned text with highlight markers per score.
pub fn render_annual(table: &AnnualTable) -> String {
    let mut grid: Vec<Vec<String>> = vec![table.headers().iter().map(|h| h.to_string()).collect()];
    for row in &table.rows {
        let mut line = vec![row.device.clone()];
        for value in &row.values {
            let cell = match value {
                Some(_) => format!("{}{}", format_score(*value), highlight(*value).marker()),
                None => "-".to_string(),
            };
            line.push(cell);
        }
        grid.push(line);
    }

    let columns = grid[0].len();
    let widths: Vec<usize> = (0..columns)
        .map(|c| {
            grid.iter()
                .map(|line| line.get(c).map(|s| s.chars().count()).unwrap_or(0))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for line in &grid {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{cell:<w$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }
    out
}

/// Logs the highlighted console view.
pub fn print_pretty(table: &AnnualTable) {
    if table.is_empty() {
        info!("No monthly summaries yet");
        return;
    }
    info!("\n{}", render_annual(table));
}

/// Logs the table as pretty-printed JSON.
pub fn print_json(table: &AnnualTable) -> Result<()> {
    let report = AnnualReport {
        generated_at: Utc::now(),
        table,
    };
    info!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Writes the table as one CSV sheet; null cells are empty fields.
pub fn write_annual<W: Write>(writer: W, table: &AnnualTable) -> Result<()> {
    let mut writer = WriterBuilder::new().has_headers(false).from_writer(writer);

    writer.write_record(table.headers())?;
    for row in &table.rows {
        let mut record = vec![row.device.clone()];
        record.extend(
            row.values
                .iter()
                .map(|v| v.map(|v| v.to_string()).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;

    Ok(())
}

/// Exports the table to `path`, replacing any existing file.
pub fn export_annual(path: &Path, table: &AnnualTable) -> Result<()> {
    debug!(path = %path.display(), devices = table.rows.len(), "Exporting annual table");
    let file = File::create(path)?;
    write_annual(file, table)
}
