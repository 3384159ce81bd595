//! Merging imported users and credentials with what the destination already has
//!
//! The planners are pure: they take the incoming records and whatever the
//! destination holds and say what to write. The orchestrator does the lookups
//! and applies the plan.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::destination::{DestinationStore, DestinationUser, NewUser};
use crate::model::{lowered_username, Credential, Membership, UserId, UserPortal, UserRecord};
use crate::storage::StorageResult;

/// Timestamp written to never-happened membership events on insert
pub fn sentinel_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(1754, 1, 1, 0, 0, 0)
        .single()
        .expect("1754-01-01T00:00:00Z is a valid UTC instant")
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteAction<T> {
    Insert(T),
    Update(T),
}

impl<T> WriteAction<T> {
    pub fn record(&self) -> &T {
        match self {
            Self::Insert(r) | Self::Update(r) => r,
        }
    }

    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }
}

/// Writes needed to bring one user's credential and membership into the destination
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialPlan {
    pub credential: WriteAction<Credential>,
    pub membership: Option<WriteAction<Membership>>,
}

/// Values used when a plan has to insert
#[derive(Debug, Clone, Copy)]
pub struct InsertDefaults {
    pub user_id: Uuid,
    pub application_id: Uuid,
    pub now: DateTime<Utc>,
}

/// Plan the credential and membership writes for one imported user
///
/// `existing_membership` is only consulted when `existing` is present, since a
/// membership hangs off its credential's ids.
pub fn plan_credential_merge(
    mut credential: Credential,
    membership: Option<Membership>,
    existing: Option<&Credential>,
    existing_membership: Option<&Membership>,
    defaults: InsertDefaults,
) -> CredentialPlan {
    credential.lowered_username = lowered_username(&credential.username);

    let credential = match existing {
        Some(current) => {
            credential.user_id = current.user_id;
            credential.application_id = current.application_id;
            credential.last_activity = current.last_activity;
            WriteAction::Update(credential)
        }
        None => {
            credential.user_id = defaults.user_id;
            credential.application_id = defaults.application_id;
            credential.last_activity = defaults.now;
            WriteAction::Insert(credential)
        }
    };

    let owner = credential.record();
    let membership = membership.map(|mut incoming| {
        match existing_membership.filter(|_| existing.is_some()) {
            Some(current) => {
                incoming.user_id = current.user_id;
                incoming.application_id = current.application_id;
                incoming.created_on = current.created_on;
                WriteAction::Update(incoming)
            }
            None => {
                let sentinel = sentinel_date();
                incoming.user_id = owner.user_id;
                incoming.application_id = owner.application_id;
                incoming.created_on = defaults.now;
                incoming.last_login = sentinel;
                incoming.last_password_changed = sentinel;
                incoming.last_lockout = sentinel;
                incoming.failed_password_attempt_window_start = sentinel;
                incoming.failed_answer_attempt_window_start = sentinel;
                WriteAction::Insert(incoming)
            }
        }
    });

    CredentialPlan {
        credential,
        membership,
    }
}

/// Write a plan to the destination
pub async fn apply_credential_plan(
    destination: &dyn DestinationStore,
    plan: &CredentialPlan,
) -> StorageResult<()> {
    match &plan.credential {
        WriteAction::Insert(c) => destination.insert_credential(c).await?,
        WriteAction::Update(c) => destination.update_credential(c).await?,
    }
    match &plan.membership {
        Some(WriteAction::Insert(m)) => destination.insert_membership(m).await?,
        Some(WriteAction::Update(m)) => destination.update_membership(m).await?,
        None => {}
    }
    Ok(())
}

/// New destination user built from a staged one
pub fn new_user(
    scope_id: i32,
    incoming: &UserRecord,
    membership: Option<&Membership>,
    created_by: Option<UserId>,
) -> NewUser {
    NewUser {
        scope_id,
        username: incoming.username.clone(),
        first_name: incoming.first_name_or_empty().to_string(),
        last_name: incoming.last_name_or_empty().to_string(),
        display_name: incoming.display_name.clone(),
        email: incoming.email.clone(),
        is_super_user: incoming.is_super_user,
        affiliate_id: incoming.affiliate_id,
        update_password: incoming.update_password,
        is_approved: membership.is_none_or(|m| m.is_approved),
        created_by,
    }
}

/// Overwrite an existing destination user with staged values
///
/// Identity and creation data stay with the destination.
pub fn merge_user(
    existing: &DestinationUser,
    incoming: &UserRecord,
    portal: Option<&UserPortal>,
    membership: Option<&Membership>,
    modified_by: Option<UserId>,
    now: DateTime<Utc>,
) -> DestinationUser {
    DestinationUser {
        user_id: existing.user_id,
        username: existing.username.clone(),
        first_name: incoming.first_name_or_empty().to_string(),
        last_name: incoming.last_name_or_empty().to_string(),
        display_name: incoming.display_name.clone(),
        email: incoming.email.clone(),
        is_super_user: incoming.is_super_user,
        affiliate_id: incoming.affiliate_id.or(existing.affiliate_id),
        update_password: incoming.update_password,
        is_approved: membership.is_none_or(|m| m.is_approved),
        is_deleted: incoming.is_deleted,
        vanity_url: portal
            .and_then(|p| p.vanity_url.clone())
            .or_else(|| existing.vanity_url.clone()),
        last_ip_address: incoming
            .last_ip_address
            .clone()
            .or_else(|| existing.last_ip_address.clone()),
        password_reset_token: incoming
            .password_reset_token
            .or(existing.password_reset_token),
        password_reset_expiration: incoming
            .password_reset_expiration
            .or(existing.password_reset_expiration),
        created_by: existing.created_by,
        created_on: existing.created_on,
        last_modified_by: modified_by.or(existing.last_modified_by),
        last_modified_on: now,
    }
}
