//! Source store over an in-memory snapshot

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    lowered_username, Credential, Membership, ProfileProperty, TimeWindow, UserAuthentication,
    UserId, UserPortal, UserRecord, UserRole,
};
use crate::source::{Page, PageQuery, SourceSnapshot, SourceStore};
use crate::storage::StorageResult;

/// Source backed by a [`SourceSnapshot`]
///
/// A user belongs to a scope when it has a portal membership there; super
/// users belong to every scope.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    snapshot: SourceSnapshot,
}

impl MemorySource {
    pub fn new(mut snapshot: SourceSnapshot) -> Self {
        snapshot.users.sort_by_key(|u| u.user_id);
        Self { snapshot }
    }

    fn in_scope(&self, user: &UserRecord, scope_id: i32) -> bool {
        user.is_super_user
            || self
                .snapshot
                .portals
                .iter()
                .any(|p| p.user_id == user.user_id && p.portal_id == scope_id)
    }

    fn matches(&self, user: &UserRecord, query: &PageQuery) -> bool {
        (query.include_deleted || !user.is_deleted)
            && query.window.contains(user.last_modified_on)
            && self.in_scope(user, query.scope_id)
    }
}

impl From<SourceSnapshot> for MemorySource {
    fn from(snapshot: SourceSnapshot) -> Self {
        Self::new(snapshot)
    }
}

#[async_trait]
impl SourceStore for MemorySource {
    async fn fetch_users(&self, query: &PageQuery) -> StorageResult<Page<UserRecord>> {
        let matching: Vec<&UserRecord> = self
            .snapshot
            .users
            .iter()
            .filter(|u| self.matches(u, query))
            .collect();

        Ok(Page {
            total_count: matching.len() as u64,
            records: matching
                .into_iter()
                .skip(query.offset())
                .take(query.page_size as usize)
                .cloned()
                .collect(),
        })
    }

    async fn credential(
        &self,
        username: &str,
        window: &TimeWindow,
    ) -> StorageResult<Option<Credential>> {
        let lowered = lowered_username(username);
        Ok(self
            .snapshot
            .credentials
            .iter()
            .find(|c| c.lowered_username == lowered && window.contains(c.last_activity))
            .cloned())
    }

    async fn membership(
        &self,
        credential_user_id: Uuid,
        application_id: Uuid,
    ) -> StorageResult<Option<Membership>> {
        Ok(self
            .snapshot
            .memberships
            .iter()
            .find(|m| m.user_id == credential_user_id && m.application_id == application_id)
            .cloned())
    }

    async fn user_roles(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Vec<UserRole>> {
        Ok(self
            .snapshot
            .roles
            .iter()
            .filter(|r| {
                r.user_id == user_id
                    && r.portal_id == scope_id
                    && window.contains(r.last_modified_on)
            })
            .cloned()
            .collect())
    }

    async fn user_portal(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Option<UserPortal>> {
        Ok(self
            .snapshot
            .portals
            .iter()
            .find(|p| {
                p.user_id == user_id && p.portal_id == scope_id && window.contains(p.created_on)
            })
            .cloned())
    }

    async fn user_authentication(
        &self,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Option<UserAuthentication>> {
        Ok(self
            .snapshot
            .authentications
            .iter()
            .find(|a| a.user_id == user_id && window.contains(a.last_modified_on))
            .cloned())
    }

    async fn user_profile(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Vec<ProfileProperty>> {
        Ok(self
            .snapshot
            .profiles
            .iter()
            .filter(|p| {
                p.user_id == user_id && p.portal_id == scope_id && window.contains(p.last_updated)
            })
            .cloned()
            .collect())
    }
}
