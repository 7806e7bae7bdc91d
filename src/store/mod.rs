//! Summary Store: persistence of monthly summary artifacts.
//!
//! [`SummaryStore`] is the seam between the pipeline and its storage.
//! [`DirStore`] keeps one CSV file per artifact in a shared directory;
//! [`MemoryStore`] keeps the same encoded bytes in a map.

mod codec;
mod dir;
mod memory;

pub use codec::{DeviceAverage, read_device_averages, read_summary, write_summary};
pub use dir::DirStore;
pub use memory::MemoryStore;

use crate::aggregate::SummaryRecord;
use crate::error::Result;

/// Named monthly summary artifacts. The backing location is the single
/// source of truth; nothing is cached between calls.
pub trait SummaryStore {
    /// Removes every existing artifact.
    fn reset(&mut self) -> Result<()>;

    /// Persists `summary` under the artifact name derived from `source_stem`,
    /// replacing any artifact of that name. Returns the artifact name.
    fn save(&mut self, source_stem: &str, summary: &[SummaryRecord]) -> Result<String>;

    /// Names of all artifacts currently present, in no particular order.
    fn list_artifacts(&self) -> Result<Vec<String>>;

    /// Reads an artifact back.
    ///
    /// # Errors
    ///
    /// [`PipelineError::ArtifactNotFound`](crate::error::PipelineError::ArtifactNotFound)
    /// if absent, [`PipelineError::CorruptArtifact`](crate::error::PipelineError::CorruptArtifact)
    /// if it lacks the summary columns or cannot be decoded.
    fn load(&self, artifact: &str) -> Result<Vec<SummaryRecord>>;

    /// Reads only the device and average columns of an artifact. Fails like
    /// [`load`](SummaryStore::load) when the artifact is absent or lacks
    /// `Gerät`/`Average_Score`; other columns may be missing.
    fn load_averages(&self, artifact: &str) -> Result<Vec<DeviceAverage>>;

    /// Fixed trailing marker of every artifact name, e.g. `"_summary.csv"`.
    fn artifact_tail(&self) -> &str;
}
