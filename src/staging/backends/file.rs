//! File-based staging repository
//!
//! Each entity kind lives in `<dir>/<kind>.json` as a list of [`StoredItem`]s.
//! The whole index is loaded on open; every `create_items` call rewrites the
//! documents of the kinds it touched. The in-memory index only takes a batch
//! once all of its documents are on disk.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::debug;

use crate::model::{EntityKind, StagedRecord, UserId};
use crate::staging::{KindTable, StagingIndex, StagingRepository, StoredItem};
use crate::storage::{read_json, write_json_atomic, StorageResult};

pub struct FileStagingRepository {
    base_dir: PathBuf,
    index: RwLock<StagingIndex>,
}

impl FileStagingRepository {
    /// Open (or create) a staging directory and load what it holds
    pub async fn open(base_dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_dir = base_dir.into();
        tokio::fs::create_dir_all(&base_dir).await?;

        let mut index = StagingIndex::new();
        for kind in EntityKind::ALL {
            let path = kind_path(&base_dir, kind);
            if let Some(items) = read_json::<Vec<StoredItem>>(&path).await? {
                debug!("Loaded {} staged {} records", items.len(), kind);
                index.set_table(kind, KindTable::from_items(items));
            }
        }

        Ok(Self {
            base_dir,
            index: RwLock::new(index),
        })
    }
}

fn kind_path(base_dir: &Path, kind: EntityKind) -> PathBuf {
    base_dir.join(format!("{}.json", kind.as_str()))
}

#[async_trait]
impl StagingRepository for FileStagingRepository {
    async fn create_items(&self, items: Vec<StagedRecord>) -> StorageResult<()> {
        let mut index = self.index.write().await;
        let mut next = index.clone();
        let touched = next.insert_all(items);

        for kind in touched {
            let items = next.table(kind).map(KindTable::to_items).unwrap_or_default();
            write_json_atomic(&kind_path(&self.base_dir, kind), &items).await?;
        }
        *index = next;
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
