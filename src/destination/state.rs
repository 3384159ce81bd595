//! Destination contents and the mutations both backends apply to them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{lowered_username, Credential, Membership, UserId};
use crate::storage::{StorageError, StorageResult};

/// A user as stored in the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationUser {
    pub user_id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub is_super_user: bool,
    #[serde(default)]
    pub affiliate_id: Option<i32>,
    #[serde(default)]
    pub update_password: bool,
    #[serde(default = "default_true")]
    pub is_approved: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub vanity_url: Option<String>,
    #[serde(default)]
    pub last_ip_address: Option<String>,
    #[serde(default)]
    pub password_reset_token: Option<Uuid>,
    #[serde(default)]
    pub password_reset_expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: Option<UserId>,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub last_modified_by: Option<UserId>,
    pub last_modified_on: DateTime<Utc>,
}

/// Values of a user about to be created; the destination assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub scope_id: i32,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub display_name: String,
    pub email: String,
    pub is_super_user: bool,
    pub affiliate_id: Option<i32>,
    pub update_password: bool,
    pub is_approved: bool,
    pub created_by: Option<UserId>,
}

/// A user's membership in a scope of the destination
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortalMembership {
    pub portal_id: i32,
    pub user_id: UserId,
    #[serde(default = "default_true")]
    pub authorised: bool,
    pub created_on: DateTime<Utc>,
}

/// Everything a destination holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationState {
    pub application_id: Uuid,
    #[serde(default)]
    pub users: Vec<DestinationUser>,
    #[serde(default)]
    pub portals: Vec<PortalMembership>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl Default for DestinationState {
    fn default() -> Self {
        Self::new(Uuid::new_v4())
    }
}

impl DestinationState {
    pub fn new(application_id: Uuid) -> Self {
        Self {
            application_id,
            users: Vec::new(),
            portals: Vec::new(),
            credentials: Vec::new(),
            memberships: Vec::new(),
        }
    }

    pub fn find_user_by_username(&self, username: &str) -> Option<&DestinationUser> {
        let lowered = lowered_username(username);
        self.users
            .iter()
            .find(|u| lowered_username(&u.username) == lowered)
    }

    pub fn create_user(&mut self, user: NewUser, now: DateTime<Utc>) -> StorageResult<UserId> {
        if self.find_user_by_username(&user.username).is_some() {
            return Err(StorageError::conflict(format!(
                "user {} already exists",
                user.username
            )));
        }

        let user_id = self.users.iter().map(|u| u.user_id).max().unwrap_or(0) + 1;
        self.users.push(DestinationUser {
            user_id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            display_name: user.display_name,
            email: user.email,
            is_super_user: user.is_super_user,
            affiliate_id: user.affiliate_id,
            update_password: user.update_password,
            is_approved: user.is_approved,
            is_deleted: false,
            vanity_url: None,
            last_ip_address: None,
            password_reset_token: None,
            password_reset_expiration: None,
            created_by: user.created_by,
            created_on: now,
            last_modified_by: user.created_by,
            last_modified_on: now,
        });
        Ok(user_id)
    }

    pub fn update_user(&mut self, user: &DestinationUser) -> StorageResult<()> {
        let slot = self
            .users
            .iter_mut()
            .find(|u| u.user_id == user.user_id)
            .ok_or_else(|| StorageError::not_found(format!("user {}", user.user_id)))?;
        *slot = user.clone();
        Ok(())
    }

    pub fn find_user_portal(&self, scope_id: i32, user_id: UserId) -> Option<&PortalMembership> {
        self.portals
            .iter()
            .find(|p| p.portal_id == scope_id && p.user_id == user_id)
    }

    pub fn add_user_portal(
        &mut self,
        scope_id: i32,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        if self.find_user_portal(scope_id, user_id).is_some() {
            return Err(StorageError::conflict(format!(
                "user {} is already a member of portal {}",
                user_id, scope_id
            )));
        }
        self.portals.push(PortalMembership {
            portal_id: scope_id,
            user_id,
            authorised: true,
            created_on: now,
        });
        Ok(())
    }

    pub fn find_credential(&self, username: &str) -> Option<&Credential> {
        let lowered = lowered_username(username);
        self.credentials
            .iter()
            .find(|c| c.lowered_username == lowered)
    }

    pub fn insert_credential(&mut self, credential: &Credential) -> StorageResult<()> {
        if self.find_credential(&credential.username).is_some() {
            return Err(StorageError::conflict(format!(
                "credential for {} already exists",
                credential.username
            )));
        }
        self.credentials.push(credential.clone());
        Ok(())
    }

    pub fn update_credential(&mut self, credential: &Credential) -> StorageResult<()> {
        let slot = self
            .credentials
            .iter_mut()
            .find(|c| c.user_id == credential.user_id)
            .ok_or_else(|| StorageError::not_found(format!("credential {}", credential.user_id)))?;
        *slot = credential.clone();
        Ok(())
    }

    pub fn find_membership(&self, user_id: Uuid, application_id: Uuid) -> Option<&Membership> {
        self.memberships
            .iter()
            .find(|m| m.user_id == user_id && m.application_id == application_id)
    }

    pub fn insert_membership(&mut self, membership: &Membership) -> StorageResult<()> {
        if self
            .find_membership(membership.user_id, membership.application_id)
            .is_some()
        {
            return Err(StorageError::conflict(format!(
                "membership for {} already exists",
                membership.user_id
            )));
        }
        self.memberships.push(membership.clone());
        Ok(())
    }

    pub fn update_membership(&mut self, membership: &Membership) -> StorageResult<()> {
        let slot = self
            .memberships
            .iter_mut()
            .find(|m| m.user_id == membership.user_id && m.application_id == membership.application_id)
            .ok_or_else(|| StorageError::not_found(format!("membership {}", membership.user_id)))?;
        *slot = membership.clone();
        Ok(())
    }
}

fn default_true() -> bool {
    true
}
