//! Checkpoint persistence for resumable jobs
//!
//! A checkpoint records how many pages of a job are fully done (`stage`), how
//! many records were processed, and optionally how far into the next page an
//! import got. It is saved after every page and every few records.

pub mod backends;
pub mod types;

pub use backends::{FileCheckpointStore, MemoryCheckpointStore};
pub use types::{Checkpoint, Direction, JobId, JobStatus, StageData};

use async_trait::async_trait;

use crate::storage::StorageResult;

/// Persistence of checkpoints keyed by job id
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    /// Load the checkpoint of a job, `None` if the job never saved one
    async fn load(&self, job_id: &JobId) -> StorageResult<Option<Checkpoint>>;

    /// Save (replace) the checkpoint of its job
    async fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()>;

    /// All stored checkpoints, ordered by job id
    async fn list(&self) -> StorageResult<Vec<Checkpoint>>;

    /// Forget a job's progress
    async fn delete(&self, job_id: &JobId) -> StorageResult<()>;
}

/// Load a job's checkpoint, starting a fresh one for `direction` when none exists
///
/// A stored checkpoint is returned as is; callers compare its direction.
pub async fn load_or_new(
    store: &dyn CheckpointStore,
    job_id: &JobId,
    direction: Direction,
) -> StorageResult<Checkpoint> {
    Ok(store
        .load(job_id)
        .await?
        .unwrap_or_else(|| Checkpoint::new(job_id.clone(), direction)))
}
