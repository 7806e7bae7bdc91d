use std::collections::HashMap;

use super::SummaryStore;
use super::codec::{DeviceAverage, read_device_averages, read_summary, write_summary};
use crate::aggregate::SummaryRecord;
use crate::config::{PipelineConfig, artifact_name};
use crate::error::{PipelineError, Result};

/// Artifacts held as encoded bytes in memory, keyed by artifact name.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    artifacts: HashMap<String, Vec<u8>>,
    tail: String,
}

impl MemoryStore {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            artifacts: HashMap::new(),
            tail: config.artifact_tail(),
        }
    }

    /// Stores arbitrary bytes under `artifact`, bypassing the encoder.
    pub fn insert_raw(&mut self, artifact: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.artifacts.insert(artifact.into(), bytes.into());
    }

    /// Encoded bytes of an artifact, if present.
    pub fn raw(&self, artifact: &str) -> Option<&[u8]> {
        self.artifacts.get(artifact).map(Vec::as_slice)
    }

    fn bytes(&self, artifact: &str) -> Result<&[u8]> {
        self.raw(artifact)
            .ok_or_else(|| PipelineError::ArtifactNotFound(artifact.to_string()))
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

impl SummaryStore for MemoryStore {
    fn reset(&mut self) -> Result<()> {
        self.artifacts.clear();
        Ok(())
    }

    fn save(&mut self, source_stem: &str, summary: &[SummaryRecord]) -> Result<String> {
        let artifact = artifact_name(source_stem, &self.tail);
        let mut bytes = Vec::new();
        write_summary(&mut bytes, summary)?;
        self.artifacts.insert(artifact.clone(), bytes);
        Ok(artifact)
    }

    fn list_artifacts(&self) -> Result<Vec<String>> {
        Ok(self.artifacts.keys().cloned().collect())
    }

    fn load(&self, artifact: &str) -> Result<Vec<SummaryRecord>> {
        read_summary(self.bytes(artifact)?, artifact)
    }

    fn load_averages(&self, artifact: &str) -> Result<Vec<DeviceAverage>> {
        read_device_averages(self.bytes(artifact)?, artifact)
    }

    fn artifact_tail(&self) -> &str {
        &self.tail
    }
}
