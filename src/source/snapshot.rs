//! Serialized source contents, as produced by a database dump

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::{
    Credential, Membership, ProfileProperty, UserAuthentication, UserPortal, UserRecord, UserRole,
};
use crate::storage::{read_json, StorageError, StorageResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSnapshot {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub roles: Vec<UserRole>,
    #[serde(default)]
    pub profiles: Vec<ProfileProperty>,
    #[serde(default)]
    pub authentications: Vec<UserAuthentication>,
    #[serde(default)]
    pub portals: Vec<UserPortal>,
    #[serde(default)]
    pub credentials: Vec<Credential>,
    #[serde(default)]
    pub memberships: Vec<Membership>,
}

impl SourceSnapshot {
    pub async fn load(path: &Path) -> StorageResult<Self> {
        read_json(path)
            .await?
            .ok_or_else(|| StorageError::not_found(format!("source snapshot {}", path.display())))
    }
}
