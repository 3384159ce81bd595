//! Sub-records exported alongside each user

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::UserId;

/// Role assignment of a user within a scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_role_id: i32,
    #[serde(default)]
    pub reference_id: UserId,
    pub user_id: UserId,
    /// Scope the role belongs to
    #[serde(default)]
    pub portal_id: i32,
    pub role_id: i32,
    pub role_name: String,
    #[serde(default)]
    pub is_owner: bool,
    #[serde(default)]
    pub effective_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
    pub last_modified_on: DateTime<Utc>,
}

/// A single profile property value of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileProperty {
    pub profile_id: i32,
    #[serde(default)]
    pub reference_id: UserId,
    pub user_id: UserId,
    /// Scope of the property definition
    #[serde(default)]
    pub portal_id: i32,
    pub property_definition_id: i32,
    pub property_name: String,
    #[serde(default)]
    pub property_value: Option<String>,
    #[serde(default)]
    pub visibility: i32,
    pub last_updated: DateTime<Utc>,
}

/// External authentication binding of a user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserAuthentication {
    pub user_authentication_id: i32,
    #[serde(default)]
    pub reference_id: UserId,
    pub user_id: UserId,
    pub authentication_type: String,
    pub authentication_token: String,
    pub last_modified_on: DateTime<Utc>,
}

/// Membership of a user in a portal (tenant/site)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPortal {
    pub user_portal_id: i32,
    #[serde(default)]
    pub reference_id: UserId,
    pub user_id: UserId,
    pub portal_id: i32,
    #[serde(default = "default_true")]
    pub authorised: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub refresh_roles: bool,
    #[serde(default)]
    pub vanity_url: Option<String>,
    pub created_on: DateTime<Utc>,
}

/// Entry of the credential store, keyed by username
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: Uuid,
    pub application_id: Uuid,
    #[serde(default)]
    pub reference_id: UserId,
    pub username: String,
    pub lowered_username: String,
    #[serde(default)]
    pub mobile_alias: Option<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    pub last_activity: DateTime<Utc>,
}

/// Form a username takes when used as a lookup key
///
/// Users and credentials are both matched on it, so a name that finds a
/// user also finds that user's credential.
pub fn lowered_username(username: &str) -> String {
    username.to_lowercase()
}

/// Password and lockout state attached to a credential
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub user_id: Uuid,
    pub application_id: Uuid,
    #[serde(default)]
    pub reference_id: UserId,
    pub password: String,
    #[serde(default)]
    pub password_format: i32,
    pub password_salt: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_approved: bool,
    #[serde(default)]
    pub is_locked_out: bool,
    pub created_on: DateTime<Utc>,
    pub last_login: DateTime<Utc>,
    pub last_password_changed: DateTime<Utc>,
    pub last_lockout: DateTime<Utc>,
    #[serde(default)]
    pub failed_password_attempt_count: i32,
    pub failed_password_attempt_window_start: DateTime<Utc>,
    #[serde(default)]
    pub failed_answer_attempt_count: i32,
    pub failed_answer_attempt_window_start: DateTime<Utc>,
    #[serde(default)]
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}
