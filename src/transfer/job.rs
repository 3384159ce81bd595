//! Job definitions and the collision policy

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::checkpoint::{Direction, JobId};
use crate::error::PortableError;
use crate::model::TimeWindow;

/// How an import treats a user whose username already exists in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionResolution {
    /// Update the existing user, keeping its id and creation data
    Overwrite,
    /// Leave the existing user untouched
    #[default]
    Ignore,
}

impl FromStr for CollisionResolution {
    type Err = PortableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "ignore" => Ok(Self::Ignore),
            other => Err(PortableError::Configuration(format!(
                "Unrecognized collision resolution: {:?} (expected overwrite or ignore)",
                other
            ))),
        }
    }
}

impl fmt::Display for CollisionResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overwrite => f.write_str("overwrite"),
            Self::Ignore => f.write_str("ignore"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Export,
    Import { collision: CollisionResolution },
}

impl JobKind {
    pub fn direction(&self) -> Direction {
        match self {
            Self::Export => Direction::Export,
            Self::Import { .. } => Direction::Import,
        }
    }
}

/// One export or import run, immutable once started
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    /// Tenant/site the job reads from (export) or writes to (import)
    pub scope_id: i32,
    pub window: TimeWindow,
    pub include_deleted: bool,
}

impl Job {
    pub fn export(id: JobId, scope_id: i32, window: TimeWindow, include_deleted: bool) -> Self {
        Self {
            id,
            kind: JobKind::Export,
            scope_id,
            window,
            include_deleted,
        }
    }

    pub fn import(id: JobId, scope_id: i32, collision: CollisionResolution) -> Self {
        Self {
            id,
            kind: JobKind::Import { collision },
            scope_id,
            window: TimeWindow::until(Utc::now()),
            include_deleted: false,
        }
    }
}

/// Job as written by a caller: loose text fields, validated into a [`Job`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobDefinition {
    #[serde(default)]
    pub id: Option<String>,
    pub kind: String,
    #[serde(default)]
    pub scope_id: i32,
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub include_deleted: bool,
    #[serde(default)]
    pub collision_resolution: Option<String>,
}

impl TryFrom<JobDefinition> for Job {
    type Error = PortableError;

    fn try_from(def: JobDefinition) -> Result<Self, Self::Error> {
        let id = def
            .id
            .filter(|id| !id.trim().is_empty())
            .map(JobId::from_string)
            .unwrap_or_default();

        let to = def.to.unwrap_or_else(Utc::now);
        if let Some(from) = def.from {
            if from >= to {
                return Err(PortableError::Validation(format!(
                    "Time window is empty: from {} is not before to {}",
                    from, to
                )));
            }
        }
        let window = TimeWindow::new(def.from, to);

        let kind = match def.kind.trim().to_ascii_lowercase().as_str() {
            "export" => JobKind::Export,
            "import" => JobKind::Import {
                collision: def
                    .collision_resolution
                    .as_deref()
                    .map(str::parse)
                    .transpose()?
                    .unwrap_or_default(),
            },
            other => {
                return Err(PortableError::Configuration(format!(
                    "Unknown job kind: {:?}",
                    other
                )))
            }
        };

        Ok(Self {
            id,
            kind,
            scope_id: def.scope_id,
            window,
            include_deleted: def.include_deleted,
        })
    }
}
