//! Staging repository: the durable buffer between export and import
//!
//! Export writes users and their sub-records here; import reads them back,
//! possibly days later, without touching the original source again.

pub mod backends;
pub mod index;

pub use backends::{FileStagingRepository, MemoryStagingRepository};
pub use index::{KindTable, StagingIndex, StoredItem};

use async_trait::async_trait;

use crate::model::{EntityKind, StagedEntity, StagedRecord, UserId};
use crate::storage::{StorageError, StorageResult};

/// Storage interface for staged records
#[async_trait]
pub trait StagingRepository: Send + Sync {
    /// Bulk upsert; staging the same `(kind, key)` twice keeps a single item
    async fn create_items(&self, items: Vec<StagedRecord>) -> StorageResult<()>;

    /// Number of staged records of a kind
    async fn count(&self, kind: EntityKind) -> StorageResult<usize>;

    /// Records of a kind in staging order
    async fn get_all_items(
        &self,
        kind: EntityKind,
        skip: usize,
        take: usize,
    ) -> StorageResult<Vec<StagedRecord>>;

    /// Records of a kind owned by the given user
    async fn get_related_items(
        &self,
        kind: EntityKind,
        parent: UserId,
    ) -> StorageResult<Vec<StagedRecord>>;

    /// Whether a record with this key is staged
    async fn contains(&self, kind: EntityKind, key: &str) -> StorageResult<bool>;
}

/// Stage a list of typed records, returning how many were written
pub async fn stage<T: StagedEntity>(
    repo: &dyn StagingRepository,
    items: Vec<T>,
) -> StorageResult<usize> {
    let count = items.len();
    if count > 0 {
        repo.create_items(items.into_iter().map(StagedEntity::into_staged).collect())
            .await?;
    }
    Ok(count)
}

/// Typed page read
pub async fn all_items<T: StagedEntity>(
    repo: &dyn StagingRepository,
    skip: usize,
    take: usize,
) -> StorageResult<Vec<T>> {
    repo.get_all_items(T::KIND, skip, take)
        .await?
        .into_iter()
        .map(downcast)
        .collect()
}

/// First staged record of type `T` owned by `parent`
pub async fn first_related<T: StagedEntity>(
    repo: &dyn StagingRepository,
    parent: UserId,
) -> StorageResult<Option<T>> {
    repo.get_related_items(T::KIND, parent)
        .await?
        .into_iter()
        .next()
        .map(downcast)
        .transpose()
}

fn downcast<T: StagedEntity>(record: StagedRecord) -> StorageResult<T> {
    let kind = record.kind();
    T::from_staged(record).ok_or_else(|| {
        StorageError::serialization(format!(
            "staged record of kind {} read as {}",
            kind,
            T::KIND
        ))
    })
}
