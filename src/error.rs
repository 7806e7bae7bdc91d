use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while normalizing uploads or reading summary artifacts.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// A required identity or type column is absent from an upload.
    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: PathBuf },

    /// An uploaded file could not be opened.
    #[error("Failed to read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed delimited data: {0}")]
    Csv(#[from] csv::Error),

    #[error("Summary artifact not found: {0}")]
    ArtifactNotFound(String),

    /// The artifact exists but cannot be used as a monthly summary.
    #[error("Corrupt summary artifact {name}: {reason}")]
    CorruptArtifact { name: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
