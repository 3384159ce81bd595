//! File-based checkpoint store
//!
//! One `<job_id>.checkpoint.json` document per job, replaced atomically on
//! every save.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::warn;

use crate::checkpoint::{Checkpoint, CheckpointStore, JobId};
use crate::storage::{read_json, write_json_atomic, StorageError, StorageResult};

const CHECKPOINT_SUFFIX: &str = ".checkpoint.json";

pub struct FileCheckpointStore {
    base_path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn checkpoint_path(&self, job_id: &JobId) -> StorageResult<PathBuf> {
        let id = job_id.file_name()?;
        Ok(self.base_path.join(format!("{}{}", id, CHECKPOINT_SUFFIX)))
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self, job_id: &JobId) -> StorageResult<Option<Checkpoint>> {
        read_json(&self.checkpoint_path(job_id)?).await
    }

    async fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()> {
        let path = self.checkpoint_path(&checkpoint.job_id)?;
        write_json_atomic(&path, checkpoint).await
    }

    async fn list(&self) -> StorageResult<Vec<Checkpoint>> {
        let mut checkpoints = Vec::new();

        if !self.base_path.exists() {
            return Ok(checkpoints);
        }

        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_checkpoint = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(CHECKPOINT_SUFFIX));
            if !is_checkpoint {
                continue;
            }

            match read_json::<Checkpoint>(&path).await {
                Ok(Some(checkpoint)) => checkpoints.push(checkpoint),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable checkpoint {}: {}", path.display(), e),
            }
        }

        checkpoints.sort_by(|a, b| a.job_id.cmp(&b.job_id));
        Ok(checkpoints)
    }

    async fn delete(&self, job_id: &JobId) -> StorageResult<()> {
        let path = self.checkpoint_path(job_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
