//! In-memory destination for testing

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::destination::{
    DestinationState, DestinationStore, DestinationUser, NewUser, PortalMembership,
};
use crate::model::{Credential, Membership, UserId};
use crate::storage::StorageResult;

#[derive(Debug, Default, Clone)]
pub struct MemoryDestination {
    state: Arc<RwLock<DestinationState>>,
}

impl MemoryDestination {
    pub fn new(state: DestinationState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Copy of the current contents
    pub async fn state(&self) -> DestinationState {
        self.state.read().await.clone()
    }
}

#[async_trait]
impl DestinationStore for MemoryDestination {
    async fn find_user_by_username(
        &self,
        username: &str,
    ) -> StorageResult<Option<DestinationUser>> {
        Ok(self.state.read().await.find_user_by_username(username).cloned())
    }

    async fn create_user(&self, user: NewUser) -> StorageResult<UserId> {
        self.state.write().await.create_user(user, Utc::now())
    }

    async fn update_user(&self, user: &DestinationUser) -> StorageResult<()> {
        self.state.write().await.update_user(user)
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
        self.state
            .write()
            .await
            .add_user_portal(scope_id, user_id, Utc::now())
    }

    async fn default_application_id(&self) -> StorageResult<Uuid> {
        Ok(self.state.read().await.application_id)
    }

    async fn find_credential(&self, username: &str) -> StorageResult<Option<Credential>> {
        Ok(self.state.read().await.find_credential(username).cloned())
    }

    async fn insert_credential(&self, credential: &Credential) -> StorageResult<()> {
        self.state.write().await.insert_credential(credential)
    }

    async fn update_credential(&self, credential: &Credential) -> StorageResult<()> {
        self.state.write().await.update_credential(credential)
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
        self.state.write().await.insert_membership(membership)
    }

    async fn update_membership(&self, membership: &Membership) -> StorageResult<()> {
        self.state.write().await.update_membership(membership)
    }
}
