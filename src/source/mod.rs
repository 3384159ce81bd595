//! Paginated source reader
//!
//! The export side reads users page by page from a source store, filtered by a
//! modification window and the deletion flag, then looks up each user's
//! related records. Pages are ordered by user id and assumed stable for the
//! duration of a job.

pub mod memory;
pub mod snapshot;

pub use memory::MemorySource;
pub use snapshot::SourceSnapshot;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    Credential, Membership, ProfileProperty, TimeWindow, UserAuthentication, UserId, UserPortal,
    UserRecord, UserRole,
};
use crate::storage::StorageResult;

/// Parameters of one page read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub scope_id: i32,
    pub page_index: u32,
    pub page_size: u32,
    pub include_deleted: bool,
    pub window: TimeWindow,
}

impl PageQuery {
    pub fn offset(&self) -> usize {
        self.page_index as usize * self.page_size as usize
    }

    pub fn at_page(&self, page_index: u32) -> Self {
        Self { page_index, ..*self }
    }
}

/// One page of users plus the total matching the query filters
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total_count: u64,
}

/// Read side of the export
///
/// Related lookups take the job's modification window: a sub-record is part of
/// the export only when its own change time falls inside it, and scoped
/// lookups only see records of the job's scope.
#[async_trait]
pub trait SourceStore: Send + Sync {
    async fn fetch_users(&self, query: &PageQuery) -> StorageResult<Page<UserRecord>>;

    /// Credential store entry matched by username
    async fn credential(
        &self,
        username: &str,
        window: &TimeWindow,
    ) -> StorageResult<Option<Credential>>;

    async fn membership(
        &self,
        credential_user_id: Uuid,
        application_id: Uuid,
    ) -> StorageResult<Option<Membership>>;

    async fn user_roles(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Vec<UserRole>>;

    async fn user_portal(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Option<UserPortal>>;

    async fn user_authentication(
        &self,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Option<UserAuthentication>>;

    async fn user_profile(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Vec<ProfileProperty>>;
}

/// Number of pages needed for `total` records
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64) as u32
}
