//! Destination kept in a single JSON document
//!
//! Every mutation rewrites the document, so a crashed import never loses a
//! write the orchestrator already counted. The cost is one full rewrite per
//! user, credential and membership written: importing N users writes on the
//! order of N² bytes. Suited to small destinations and local runs; a
//! production destination belongs behind its own [`DestinationStore`].

use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::destination::{
    DestinationState, DestinationStore, DestinationUser, NewUser, PortalMembership,
};
use crate::model::{Credential, Membership, UserId};
use crate::storage::{read_json, write_json_atomic, StorageResult};

pub struct FileDestination {
    path: PathBuf,
    state: RwLock<DestinationState>,
}

impl FileDestination {
    /// Open an existing destination document or start an empty one
    pub async fn open(path: impl Into<PathBuf>) -> StorageResult<Self> {
        let path = path.into();
        let state = match read_json::<DestinationState>(&path).await? {
            Some(state) => state,
            None => {
                info!("Creating new destination at {}", path.display());
                let state = DestinationState::default();
                write_json_atomic(&path, &state).await?;
                state
            }
        };

        Ok(Self {
            path,
            state: RwLock::new(state),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut DestinationState) -> StorageResult<T> + Send,
    ) -> StorageResult<T> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = apply(&mut next)?;
        write_json_atomic(&self.path, &next).await?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl DestinationStore for FileDestination {
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<DestinationUser>> {
        Ok(self.state.read().await.find_user_by_username(username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<UserId> {
        self.mutate(|s| s.create_user(user, Utc::now())).await
    }

    async fn update_user(&self, user: &DestinationUser) -> StorageResult<()> {
        self.mutate(|s| s.update_user(user)).await
    }

    async fn find_user_portal(
        &self,
        scope_id: i32,
        user_id: UserId,
    ) -> StorageResult<Option<PortalMembership>> {
        Ok(self
            .state
            .read()
            .await
            .find_user_portal(scope_id, user_id)
            .cloned())
    }

    async fn add_user_portal(&self, scope_id: i32, user_id: UserId) -> StorageResult<()> {
        self.mutate(|s| s.add_user_portal(scope_id, user_id, Utc::now()))
            .await
    }

    async fn default_application_id(&self) -> StorageResult<Uuid> {
        Ok(self.state.read().await.application_id)
    }

    async fn find_credential(&self, username: &str) -> StorageResult<Option<Credential>> {
        Ok(self.state.read().await.find_credential(username).cloned())
    }

    async fn insert_credential(&self, credential: &Credential) -> StorageResult<()> {
        self.mutate(|s| s.insert_credential(credential)).await
    }

    async fn update_credential(&self, credential: &Credential) -> StorageResult<()> {
        self.mutate(|s| s.update_credential(credential)).await
    }

    async fn find_membership(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> StorageResult<Option<Membership>> {
        Ok(self
            .state
            .read()
            .await
            .find_membership(user_id, application_id)
            .cloned())
    }

    async fn insert_membership(&self, membership: &Membership) -> StorageResult<()> {
        self.mutate(|s| s.insert_membership(membership)).await
    }

    async fn update_membership(&self, membership: &Membership) -> StorageResult<()> {
        self.mutate(|s| s.update_membership(membership)).await
    }
}
