use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::SummaryStore;
use super::codec::{DeviceAverage, read_device_averages, read_summary, write_summary};
use crate::aggregate::SummaryRecord;
use crate::config::{PipelineConfig, artifact_name};
use crate::error::{PipelineError, Result};

/// Artifacts as files in one output directory.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
    tail: String,
}

impl DirStore {
    /// Uses `dir` as the artifact directory, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>, config: &PipelineConfig) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            tail: config.artifact_tail(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn artifact_path(&self, artifact: &str) -> PathBuf {
        self.dir.join(artifact)
    }

    fn open_artifact(&self, artifact: &str) -> Result<BufReader<File>> {
        let path = self.artifact_path(artifact);
        if !path.is_file() {
            return Err(PipelineError::ArtifactNotFound(artifact.to_string()));
        }
        Ok(BufReader::new(File::open(&path)?))
    }

    fn artifact_files(&self) -> Result<Vec<(String, PathBuf)>> {
        let mut found = Vec::new();
        if !self.dir.exists() {
            return Ok(found);
        }

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if name.ends_with(&self.tail) {
                    found.push((name.to_string(), entry.path()));
                }
            }
        }

        Ok(found)
    }
}

impl SummaryStore for DirStore {
    fn reset(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let mut removed = 0usize;
        for (_, path) in self.artifact_files()? {
            fs::remove_file(&path)?;
            removed += 1;
        }
        info!(dir = %self.dir.display(), removed, "Summary directory cleared");
        Ok(())
    }

    fn save(&mut self, source_stem: &str, summary: &[SummaryRecord]) -> Result<String> {
        let artifact = artifact_name(source_stem, &self.tail);
        let path = self.artifact_path(&artifact);

        let file = File::create(&path)?;
        write_summary(BufWriter::new(file), summary)?;

        debug!(path = %path.display(), rows = summary.len(), "Summary artifact written");
        Ok(artifact)
    }

    fn list_artifacts(&self) -> Result<Vec<String>> {
        Ok(self
            .artifact_files()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    fn load(&self, artifact: &str) -> Result<Vec<SummaryRecord>> {
        read_summary(self.open_artifact(artifact)?, artifact)
    }

    fn load_averages(&self, artifact: &str) -> Result<Vec<DeviceAverage>> {
        read_device_averages(self.open_artifact(artifact)?, artifact)
    }

    fn artifact_tail(&self) -> &str {
        &self.tail
    }
}
