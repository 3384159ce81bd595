//! The user record, root of every exported aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Numeric user identifier as assigned by a store
pub type UserId = i32;

/// A user as read from the source store and written to staging
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub user_id: UserId,
    /// Natural key used for collision detection on import
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub display_name: String,
    pub email: String,
    #[serde(default)]
    pub is_super_user: bool,
    #[serde(default)]
    pub affiliate_id: Option<i32>,
    #[serde(default)]
    pub update_password: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub last_ip_address: Option<String>,
    #[serde(default)]
    pub password_reset_token: Option<Uuid>,
    #[serde(default)]
    pub password_reset_expiration: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by_user_id: Option<UserId>,
    #[serde(default)]
    pub created_by_user_name: Option<String>,
    pub created_on: DateTime<Utc>,
    #[serde(default)]
    pub last_modified_by_user_id: Option<UserId>,
    #[serde(default)]
    pub last_modified_by_user_name: Option<String>,
    pub last_modified_on: DateTime<Utc>,
}

impl UserRecord {
    /// First name with a missing value normalized to the empty string
    pub fn first_name_or_empty(&self) -> &str {
        self.first_name.as_deref().unwrap_or_default()
    }

    /// Last name with a missing value normalized to the empty string
    pub fn last_name_or_empty(&self) -> &str {
        self.last_name.as_deref().unwrap_or_default()
    }
}
