//! In-memory checkpoint store for testing

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::checkpoint::{Checkpoint, CheckpointStore, JobId};
use crate::storage::StorageResult;

/// In-memory checkpoint store
#[derive(Debug, Default, Clone)]
pub struct MemoryCheckpointStore {
    checkpoints: Arc<RwLock<BTreeMap<JobId, Checkpoint>>>,
    saves: Arc<AtomicUsize>,
}

impl MemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Acquire)
    }
}

#[async_trait]
impl CheckpointStore for MemoryCheckpointStore {
    async fn load(&self, job_id: &JobId) -> StorageResult<Option<Checkpoint>> {
        Ok(self.checkpoints.read().await.get(job_id).cloned())
    }

    async fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()> {
        self.checkpoints
            .write()
            .await
            .insert(checkpoint.job_id.clone(), checkpoint.clone());
        self.saves.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<Checkpoint>> {
        Ok(self.checkpoints.read().await.values().cloned().collect())
    }

    async fn delete(&self, job_id: &JobId) -> StorageResult<()> {
        self.checkpoints.write().await.remove(job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{load_or_new, Direction};

    #[tokio::test]
    async fn test_load_or_new_starts_fresh() {
        let store = MemoryCheckpointStore::new();
        let cp = load_or_new(&store, &JobId::from_string("missing"), Direction::Import)
            .await
            .unwrap();
        assert_eq!(cp.direction, Direction::Import);
        assert_eq!(cp.stage, 0);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_save_replaces_previous_version() {
        let store = MemoryCheckpointStore::new();
        let mut cp = Checkpoint::new(JobId::from_string("job"), Direction::Export);
        store.save(&cp).await.unwrap();
        cp.advance_stage();
        store.save(&cp).await.unwrap();

        let loaded = store.load(&cp.job_id).await.unwrap().unwrap();
        assert_eq!(loaded.stage, 1);
        assert_eq!(store.list().await.unwrap().len(), 1);
        assert_eq!(store.save_count(), 2);
    }
}
