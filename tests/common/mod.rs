//! Common test utilities and fixtures
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use portable::checkpoint::{Checkpoint, CheckpointStore, JobId, MemoryCheckpointStore};
use portable::destination::{
    DestinationStore, DestinationUser, MemoryDestination, NewUser, PortalMembership,
};
use portable::model::{
    Credential, Membership, ProfileProperty, TimeWindow, UserAuthentication, UserId, UserPortal,
    UserRecord, UserRole,
};
use portable::source::{MemorySource, Page, PageQuery, SourceSnapshot, SourceStore};
use portable::staging::MemoryStagingRepository;
use portable::storage::{StorageError, StorageResult};
use portable::transfer::{CancelSignal, CollisionResolution, Job, TransferSettings, UsersTransfer};

pub const APPLICATION_ID: Uuid = Uuid::from_u128(0xA11);

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn user(id: UserId) -> UserRecord {
    UserRecord {
        user_id: id,
        username: format!("user{id}"),
        first_name: Some(format!("First{id}")),
        last_name: Some(format!("Last{id}")),
        display_name: format!("User {id}"),
        email: format!("user{id}@example.com"),
        is_super_user: false,
        affiliate_id: None,
        update_password: false,
        is_deleted: false,
        last_ip_address: None,
        password_reset_token: None,
        password_reset_expiration: None,
        created_by_user_id: None,
        created_by_user_name: None,
        created_on: base_time(),
        last_modified_by_user_id: None,
        last_modified_by_user_name: None,
        last_modified_on: base_time() + Duration::minutes(id as i64),
    }
}

pub fn credential_for(user: &UserRecord) -> Credential {
    Credential {
        user_id: Uuid::from_u128(user.user_id as u128),
        application_id: APPLICATION_ID,
        reference_id: 0,
        username: user.username.clone(),
        lowered_username: user.username.to_lowercase(),
        mobile_alias: None,
        is_anonymous: false,
        last_activity: base_time(),
    }
}

pub fn membership_for(credential: &Credential) -> Membership {
    let at = base_time();
    Membership {
        user_id: credential.user_id,
        application_id: credential.application_id,
        reference_id: 0,
        password: format!("hash-{}", credential.username),
        password_format: 1,
        password_salt: "salt".to_string(),
        email: None,
        is_approved: true,
        is_locked_out: false,
        created_on: at,
        last_login: at,
        last_password_changed: at,
        last_lockout: at,
        failed_password_attempt_count: 0,
        failed_password_attempt_window_start: at,
        failed_answer_attempt_count: 0,
        failed_answer_attempt_window_start: at,
        comment: None,
    }
}

pub fn role_for(user: &UserRecord) -> UserRole {
    UserRole {
        user_role_id: user.user_id * 10,
        reference_id: 0,
        user_id: user.user_id,
        portal_id: 0,
        role_id: 1,
        role_name: "Registered Users".to_string(),
        is_owner: false,
        effective_date: None,
        expiry_date: None,
        last_modified_on: base_time(),
    }
}

pub fn portal_for(user: &UserRecord, scope_id: i32) -> UserPortal {
    UserPortal {
        user_portal_id: user.user_id,
        reference_id: 0,
        user_id: user.user_id,
        portal_id: scope_id,
        authorised: true,
        is_deleted: false,
        refresh_roles: false,
        vanity_url: None,
        created_on: base_time(),
    }
}

pub fn profile_for(user: &UserRecord) -> ProfileProperty {
    ProfileProperty {
        profile_id: user.user_id,
        reference_id: 0,
        user_id: user.user_id,
        portal_id: 0,
        property_definition_id: 1,
        property_name: "City".to_string(),
        property_value: Some("Springfield".to_string()),
        visibility: 0,
        last_updated: base_time(),
    }
}

pub fn authentication_for(user: &UserRecord) -> UserAuthentication {
    UserAuthentication {
        user_authentication_id: user.user_id,
        reference_id: 0,
        user_id: user.user_id,
        authentication_type: "OpenID".to_string(),
        authentication_token: format!("token-{}", user.user_id),
        last_modified_on: base_time(),
    }
}

/// Snapshot of `n` users in scope 0, each with a full set of related records;
/// only even-numbered users have an external authentication
pub fn snapshot(n: i32) -> SourceSnapshot {
    let mut snapshot = SourceSnapshot::default();
    for id in 1..=n {
        add_user(&mut snapshot, user(id));
    }
    snapshot
}

pub fn add_user(snapshot: &mut SourceSnapshot, user: UserRecord) {
    add_user_in_scope(snapshot, user, 0);
}

/// Like [`add_user`], with the portal, role and profile in `scope_id`
pub fn add_user_in_scope(snapshot: &mut SourceSnapshot, user: UserRecord, scope_id: i32) {
    let credential = credential_for(&user);
    snapshot.memberships.push(membership_for(&credential));
    snapshot.credentials.push(credential);
    snapshot.roles.push(UserRole {
        portal_id: scope_id,
        ..role_for(&user)
    });
    snapshot.portals.push(portal_for(&user, scope_id));
    snapshot.profiles.push(ProfileProperty {
        portal_id: scope_id,
        ..profile_for(&user)
    });
    if user.user_id % 2 == 0 {
        snapshot.authentications.push(authentication_for(&user));
    }
    snapshot.users.push(user);
}

pub fn window() -> TimeWindow {
    TimeWindow::until(base_time() + Duration::days(365))
}

pub fn export_job(id: &str) -> Job {
    Job::export(JobId::from_string(id), 0, window(), false)
}

pub fn import_job(id: &str, collision: CollisionResolution) -> Job {
    Job::import(JobId::from_string(id), 0, collision)
}

pub fn settings(page_size: u32, checkpoint_interval: u64) -> TransferSettings {
    TransferSettings {
        page_size,
        checkpoint_interval,
    }
}

pub fn destination_user(user_id: UserId, username: &str) -> DestinationUser {
    let created = Utc.with_ymd_and_hms(2020, 6, 1, 12, 0, 0).unwrap();
    DestinationUser {
        user_id,
        username: username.to_string(),
        first_name: "Original".to_string(),
        last_name: "Name".to_string(),
        display_name: format!("Original {username}"),
        email: format!("{username}@old.example.com"),
        is_super_user: false,
        affiliate_id: None,
        update_password: false,
        is_approved: true,
        is_deleted: false,
        vanity_url: None,
        last_ip_address: None,
        password_reset_token: None,
        password_reset_expiration: None,
        created_by: None,
        created_on: created,
        last_modified_by: None,
        last_modified_on: created,
    }
}

/// Memory-backed stores shared between runs of the same job
#[derive(Clone, Default)]
pub struct Harness {
    pub checkpoints: MemoryCheckpointStore,
    pub staging: MemoryStagingRepository,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfer(&self, settings: TransferSettings) -> UsersTransfer {
        UsersTransfer::new(
            Arc::new(self.checkpoints.clone()),
            Arc::new(self.staging.clone()),
            settings,
        )
    }

    pub async fn checkpoint(&self, job: &Job) -> Checkpoint {
        self.checkpoints
            .load(&job.id)
            .await
            .unwrap()
            .expect("checkpoint saved")
    }

    /// Export `snapshot` completely into this harness' staging
    pub async fn stage(&self, snapshot: SourceSnapshot) {
        let source = MemorySource::new(snapshot);
        self.transfer(settings(1000, 100))
            .export(&export_job("fixture-export"), &source)
            .await
            .unwrap();
    }
}

/// Source wrapper that can fail a page read or cancel a job part way
pub struct ScriptedSource {
    inner: MemorySource,
    fail_page: Option<u32>,
    failures_left: AtomicUsize,
    cancel_after: Option<(usize, CancelSignal)>,
    credential_calls: AtomicUsize,
}

impl ScriptedSource {
    pub fn new(snapshot: SourceSnapshot) -> Self {
        Self {
            inner: MemorySource::new(snapshot),
            fail_page: None,
            failures_left: AtomicUsize::new(0),
            cancel_after: None,
            credential_calls: AtomicUsize::new(0),
        }
    }

    /// Fail the next read of `page_index` once
    pub fn failing_once_on_page(mut self, page_index: u32) -> Self {
        self.fail_page = Some(page_index);
        self.failures_left = AtomicUsize::new(1);
        self
    }

    /// Cancel `signal` while collecting the `n`th user
    pub fn cancelling_after(mut self, n: usize, signal: CancelSignal) -> Self {
        self.cancel_after = Some((n, signal));
        self
    }
}

#[async_trait]
impl SourceStore for ScriptedSource {
    async fn fetch_users(&self, query: &PageQuery) -> StorageResult<Page<UserRecord>> {
        if self.fail_page == Some(query.page_index)
            && self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
        {
            return Err(StorageError::unavailable("source connection lost"));
        }
        self.inner.fetch_users(query).await
    }

    async fn credential(
        &self,
        username: &str,
        window: &TimeWindow,
    ) -> StorageResult<Option<Credential>> {
        let calls = self.credential_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, signal)) = &self.cancel_after {
            if calls == *after {
                signal.cancel();
            }
        }
        self.inner.credential(username, window).await
    }

    async fn membership(
        &self,
        credential_user_id: Uuid,
        application_id: Uuid,
    ) -> StorageResult<Option<Membership>> {
        self.inner
            .membership(credential_user_id, application_id)
            .await
    }

    async fn user_roles(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Vec<UserRole>> {
        self.inner.user_roles(scope_id, user_id, window).await
    }

    async fn user_portal(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Option<UserPortal>> {
        self.inner.user_portal(scope_id, user_id, window).await
    }

    async fn user_authentication(
        &self,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Option<UserAuthentication>> {
        self.inner.user_authentication(user_id, window).await
    }

    async fn user_profile(
        &self,
        scope_id: i32,
        user_id: UserId,
        window: &TimeWindow,
    ) -> StorageResult<Vec<ProfileProperty>> {
        self.inner.user_profile(scope_id, user_id, window).await
    }
}

/// Destination wrapper that can fail or cancel after a number of user creations
pub struct ScriptedDestination {
    pub inner: MemoryDestination,
    creates: AtomicUsize,
    fail_after: Option<usize>,
    cancel_after: Option<(usize, CancelSignal)>,
}

impl ScriptedDestination {
    pub fn new(inner: MemoryDestination) -> Self {
        Self {
            inner,
            creates: AtomicUsize::new(0),
            fail_after: None,
            cancel_after: None,
        }
    }

    /// Succeed `n` creations, then fail every further one
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Cancel `signal` on the `n`th creation
    pub fn cancelling_after(mut self, n: usize, signal: CancelSignal) -> Self {
        self.cancel_after = Some((n, signal));
        self
    }
}

#[async_trait]
impl DestinationStore for ScriptedDestination {
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<DestinationUser>> {
        self.inner.find_user_by_username(username).await
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<UserId> {
        let done = self.creates.load(Ordering::SeqCst);
        if self.fail_after.is_some_and(|n| done >= n) {
            return Err(StorageError::unavailable("destination went away"));
        }
        let id = self.inner.create_user(user).await?;
        let done = self.creates.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, signal)) = &self.cancel_after {
            if done == *after {
                signal.cancel();
            }
        }
        Ok(id)
    }

    async fn update_user(&self, user: &DestinationUser) -> StorageResult<()> {
        self.inner.update_user(user).await
    }

    async fn find_user_portal(
        &self,
        scope_id: i32,
        user_id: UserId,
    ) -> StorageResult<Option<PortalMembership>> {
        self.inner.find_user_portal(scope_id, user_id).await
    }

    async fn add_user_portal(&self, scope_id: i32, user_id: UserId) -> StorageResult<()> {
        self.inner.add_user_portal(scope_id, user_id).await
    }

    async fn default_application_id(&self) -> StorageResult<Uuid> {
        self.inner.default_application_id().await
    }

    async fn find_credential(&self, username: &str) -> StorageResult<Option<Credential>> {
        self.inner.find_credential(username).await
    }

    async fn insert_credential(&self, credential: &Credential) -> StorageResult<()> {
        self.inner.insert_credential(credential).await
    }

    async fn update_credential(&self, credential: &Credential) -> StorageResult<()> {
        self.inner.update_credential(credential).await
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> StorageResult<Option<Membership>> {
        self.inner.find_membership(user_id, application_id).await
    }

    async fn insert_membership(&self, membership: &Membership) -> StorageResult<()> {
        self.inner.insert_membership(membership).await
    }

    async fn update_membership(&self, membership: &Membership) -> StorageResult<()> {
        self.inner.update_membership(membership).await
    }
}

/// Checkpoint store whose saves can be switched to fail
#[derive(Default)]
pub struct FlakyCheckpointStore {
    pub inner: MemoryCheckpointStore,
    failing: AtomicBool,
    pub failed_saves: AtomicUsize,
}

impl FlakyCheckpointStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.failing.store(true, Ordering::SeqCst);
        store
    }
}

#[async_trait]
impl CheckpointStore for FlakyCheckpointStore {
    async fn load(&self, job_id: &JobId) -> StorageResult<Option<Checkpoint>> {
        self.inner.load(job_id).await
    }

    async fn save(&self, checkpoint: &Checkpoint) -> StorageResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            self.failed_saves.fetch_add(1, Ordering::SeqCst);
            return Err(StorageError::unavailable("checkpoint disk full"));
        }
        self.inner.save(checkpoint).await
    }

    async fn list(&self) -> StorageResult<Vec<Checkpoint>> {
        self.inner.list().await
    }

    async fn delete(&self, job_id: &JobId) -> StorageResult<()> {
        self.inner.delete(job_id).await
    }
}
