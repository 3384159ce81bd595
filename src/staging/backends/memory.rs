//! In-memory staging repository for testing

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::model::{EntityKind, StagedRecord, UserId};
use crate::staging::{StagingIndex, StagingRepository};
use crate::storage::StorageResult;

#[derive(Debug, Default, Clone)]
pub struct MemoryStagingRepository {
    index: Arc<RwLock<StagingIndex>>,
}

impl MemoryStagingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StagingRepository for MemoryStagingRepository {
    async fn create_items(&self, items: Vec<StagedRecord>) -> StorageResult<()> {
        self.index.write().await.insert_all(items);
        Ok(())
    }

    async fn count(&self, kind: EntityKind) -> StorageResult<usize> {
        Ok(self.index.read().await.count(kind))
    }

    async fn get_all_items(
        &self,
        kind: EntityKind,
        skip: usize,
        take: usize,
    ) -> StorageResult<Vec<StagedRecord>> {
        Ok(self.index.read().await.page(kind, skip, take))
    }

    async fn get_related_items(
        &self,
        kind: EntityKind,
        parent: UserId,
    ) -> StorageResult<Vec<StagedRecord>> {
        Ok(self.index.read().await.related(kind, parent))
    }

    async fn contains(&self, kind: EntityKind, key: &str) -> StorageResult<bool> {
        Ok(self.index.read().await.contains(kind, key))
    }
}
