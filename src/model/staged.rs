//! Closed set of record types that can live in the staging repository

use serde::{Deserialize, Serialize};
use std::fmt;

use super::related::{
    Credential, Membership, ProfileProperty, UserAuthentication, UserPortal, UserRole,
};
use super::user::{UserId, UserRecord};

/// Kind of a staged record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    UserRole,
    ProfileProperty,
    UserAuthentication,
    UserPortal,
    Credential,
    Membership,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::User,
        EntityKind::UserRole,
        EntityKind::ProfileProperty,
        EntityKind::UserAuthentication,
        EntityKind::UserPortal,
        EntityKind::Credential,
        EntityKind::Membership,
    ];

    /// Stable identifier, also used as the staging file stem
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::UserRole => "user_role",
            Self::ProfileProperty => "profile_property",
            Self::UserAuthentication => "user_authentication",
            Self::UserPortal => "user_portal",
            Self::Credential => "credential",
            Self::Membership => "membership",
        }
    }

    /// Human readable plural used in result summaries
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "Users",
            Self::UserRole => "User Roles",
            Self::ProfileProperty => "User Profiles",
            Self::UserAuthentication => "User Authentication",
            Self::UserPortal => "User Portals",
            Self::Credential => "Credentials",
            Self::Membership => "Memberships",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A record of any kind as held by the staging repository
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "record", rename_all = "snake_case")]
pub enum StagedRecord {
    User(UserRecord),
    UserRole(UserRole),
    ProfileProperty(ProfileProperty),
    UserAuthentication(UserAuthentication),
    UserPortal(UserPortal),
    Credential(Credential),
    Membership(Membership),
}

impl StagedRecord {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::User(_) => EntityKind::User,
            Self::UserRole(_) => EntityKind::UserRole,
            Self::ProfileProperty(_) => EntityKind::ProfileProperty,
            Self::UserAuthentication(_) => EntityKind::UserAuthentication,
            Self::UserPortal(_) => EntityKind::UserPortal,
            Self::Credential(_) => EntityKind::Credential,
            Self::Membership(_) => EntityKind::Membership,
        }
    }

    /// Key unique within the record's kind; re-staging the same key replaces the item
    pub fn key(&self) -> String {
        match self {
            Self::User(r) => r.user_id.to_string(),
            Self::UserRole(r) => r.user_role_id.to_string(),
            Self::ProfileProperty(r) => r.profile_id.to_string(),
            Self::UserAuthentication(r) => r.user_authentication_id.to_string(),
            Self::UserPortal(r) => r.user_portal_id.to_string(),
            Self::Credential(r) => r.user_id.to_string(),
            Self::Membership(r) => r.user_id.to_string(),
        }
    }

    /// Source id of the owning user; a user references itself
    pub fn reference_id(&self) -> UserId {
        match self {
            Self::User(r) => r.user_id,
            Self::UserRole(r) => r.reference_id,
            Self::ProfileProperty(r) => r.reference_id,
            Self::UserAuthentication(r) => r.reference_id,
            Self::UserPortal(r) => r.reference_id,
            Self::Credential(r) => r.reference_id,
            Self::Membership(r) => r.reference_id,
        }
    }
}

/// Typed access to one variant of [`StagedRecord`]
pub trait StagedEntity: Sized {
    const KIND: EntityKind;

    fn into_staged(self) -> StagedRecord;

    fn from_staged(record: StagedRecord) -> Option<Self>;
}

/// Sub-record that can be linked to its owning user
pub trait Related {
    fn tag(&mut self, parent: UserId);
}

macro_rules! staged_entity {
    ($ty:ty, $variant:ident) => {
        impl StagedEntity for $ty {
            const KIND: EntityKind = EntityKind::$variant;

            fn into_staged(self) -> StagedRecord {
                StagedRecord::$variant(self)
            }

            fn from_staged(record: StagedRecord) -> Option<Self> {
                match record {
                    StagedRecord::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

macro_rules! related {
    ($ty:ty) => {
        impl Related for $ty {
            fn tag(&mut self, parent: UserId) {
                self.reference_id = parent;
            }
        }
    };
}

staged_entity!(UserRecord, User);
staged_entity!(UserRole, UserRole);
staged_entity!(ProfileProperty, ProfileProperty);
staged_entity!(UserAuthentication, UserAuthentication);
staged_entity!(UserPortal, UserPortal);
staged_entity!(Credential, Credential);
staged_entity!(Membership, Membership);

related!(UserRole);
related!(ProfileProperty);
related!(UserAuthentication);
related!(UserPortal);
related!(Credential);
related!(Membership);
