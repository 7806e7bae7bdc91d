//! Batch driver: clear the store, then normalize, aggregate and save each
//! upload in order. One file failing never stops the rest.

use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use crate::aggregate::aggregate;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::normalizer::normalize;
use crate::store::SummaryStore;
use crate::table::{RawTable, read_raw_table};

/// What a successfully processed upload produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedFile {
    pub artifact: String,
    pub long_rows: usize,
    pub groups: usize,
}

#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: std::result::Result<ProcessedFile, String>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Runs one upload table through the pipeline and saves its summary under
/// `source_stem`.
pub fn process_table<S: SummaryStore + ?Sized>(
    store: &mut S,
    source_stem: &str,
    raw: &RawTable,
    config: &PipelineConfig,
) -> Result<ProcessedFile> {
    let long = normalize(raw, config)?;
    let summary = aggregate(&long);
    let artifact = store.save(source_stem, &summary)?;

    Ok(ProcessedFile {
        artifact,
        long_rows: long.len(),
        groups: summary.len(),
    })
}

fn process_file<S: SummaryStore + ?Sized>(
    store: &mut S,
    path: &Path,
    config: &PipelineConfig,
) -> Result<ProcessedFile> {
    let raw = read_raw_table(path, config.delimiter)?;
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    process_table(store, &stem, &raw, config)
}

/// Processes a batch of uploads against a freshly cleared store.
///
/// # Errors
///
/// Fails only if the store cannot be reset. Per-file failures are recorded
/// in the returned [`BatchReport`].
#[tracing::instrument(skip(store, inputs, config), fields(files = inputs.len()))]
pub fn process_batch<S: SummaryStore + ?Sized>(
    store: &mut S,
    inputs: &[PathBuf],
    config: &PipelineConfig,
) -> Result<BatchReport> {
    store.reset()?;

    let mut report = BatchReport::default();

    for path in inputs {
        let result = process_file(store, path, config);
        match &result {
            Ok(done) => {
                if done.long_rows == 0 {
                    warn!(source = %path.display(), "No accepted rows in upload");
                }
                info!(
                    source = %path.display(),
                    artifact = %done.artifact,
                    long_rows = done.long_rows,
                    groups = done.groups,
                    "Upload processed"
                );
            }
            Err(e) => {
                error!(source = %path.display(), error = %e, "Upload failed");
            }
        }
        report.outcomes.push(FileOutcome {
            source: path.clone(),
            result: result.map_err(|e| e.to_string()),
        });
    }

    info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Batch complete"
    );
    Ok(report)
}
