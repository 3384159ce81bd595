//! Record types moved through the export/import pipeline
//!
//! A user is exported together with the sub-records that belong to it. Every
//! sub-record carries a `reference_id` holding the owning user's source id so
//! the import side can find it again in the staging repository.

pub mod related;
pub mod staged;
pub mod user;
pub mod window;

pub use related::{
    lowered_username, Credential, Membership, ProfileProperty, UserAuthentication, UserPortal,
    UserRole,
};
pub use staged::{EntityKind, Related, StagedEntity, StagedRecord};
pub use user::{UserId, UserRecord};
pub use window::TimeWindow;
