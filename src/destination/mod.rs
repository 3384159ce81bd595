//! Destination store written by the import
//!
//! Users are matched on their natural key (the username, case-insensitive).
//! Credentials and memberships are matched on username and on
//! `(user_id, application_id)` respectively.

pub mod file;
pub mod memory;
pub mod state;

pub use file::FileDestination;
pub use memory::MemoryDestination;
pub use state::{DestinationState, DestinationUser, NewUser, PortalMembership};

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Credential, Membership, UserId};
use crate::storage::StorageResult;

#[async_trait]
pub trait DestinationStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str)
        -> StorageResult<Option<DestinationUser>>;

    /// Insert a user, returning the id the destination assigned
    async fn create_user(&self, user: NewUser) -> StorageResult<UserId>;

    async fn update_user(&self, user: &DestinationUser) -> StorageResult<()>;

    async fn find_user_portal(
        &self,
        scope_id: i32,
        user_id: UserId,
    ) -> StorageResult<Option<PortalMembership>>;

    async fn add_user_portal(&self, scope_id: i32, user_id: UserId) -> StorageResult<()>;

    /// Application new credentials are created under
    async fn default_application_id(&self) -> StorageResult<Uuid>;

    async fn find_credential(&self, username: &str) -> StorageResult<Option<Credential>>;

    async fn insert_credential(&self, credential: &Credential) -> StorageResult<()>;

    async fn update_credential(&self, credential: &Credential) -> StorageResult<()>;

    async fn find_membership(
        &self,
        user_id: Uuid,
        application_id: Uuid,
    ) -> StorageResult<Option<Membership>>;

    async fn insert_membership(&self, membership: &Membership) -> StorageResult<()>;

    async fn update_membership(&self, membership: &Membership) -> StorageResult<()>;
}
