//! Wide-form upload tables as read from disk.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{PipelineError, Result};

/// One uploaded file: the header row and every data row as raw text.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    /// Where the table came from; used in error messages.
    pub origin: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(origin: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            origin: origin.into(),
            headers,
            rows,
        }
    }

    /// Reads a header-row delimited table. Rows may be ragged.
    pub fn from_reader<R: Read>(reader: R, delimiter: u8, origin: impl Into<PathBuf>) -> Result<Self> {
        let mut rdr = ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in rdr.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self::new(origin, headers, rows))
    }

    /// Cell text at `row`/`col`, empty when the row is short.
    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Opens and parses an uploaded file.
pub fn read_raw_table(path: &Path, delimiter: u8) -> Result<RawTable> {
    let file = File::open(path).map_err(|source| PipelineError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = RawTable::from_reader(file, delimiter, path)?;
    debug!(
        path = %path.display(),
        columns = table.headers.len(),
        rows = table.rows.len(),
        "Upload read"
    );
    Ok(table)
}
