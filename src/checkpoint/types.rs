//! Checkpoint state threaded through an export or import run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::storage::{StorageError, StorageResult};

/// Identifier of an export or import job
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JobId(String);

impl JobId {
    /// Create a new random job ID
    pub fn new() -> Self {
        Self(format!("job-{}", uuid::Uuid::new_v4()))
    }

    /// Create from an existing string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The id as a single path component, for per-job files and directories
    pub fn file_name(&self) -> StorageResult<&str> {
        let id = self.as_str();
        if id.is_empty() || id.contains(['/', '\\']) || id.starts_with('.') {
            return Err(StorageError::configuration(format!(
                "Job id is not usable as a file name: {:?}",
                id
            )));
        }
        Ok(id)
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a job; `Running` is entered again on every resume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[default]
    NotStarted,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NotStarted => "not started",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Which side of the transfer a checkpoint tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Export,
    Import,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Export => "export",
            Self::Import => "import",
        })
    }
}

/// Resume state below page granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageData {
    #[default]
    None,
    /// Records of the page at `stage` that were already processed
    PartialPageSkip { skip: u32 },
}

impl StageData {
    pub fn skip(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::PartialPageSkip { skip } => *skip,
        }
    }

    /// `None` for zero, so a fresh page never carries an empty skip marker
    pub fn partial(skip: u32) -> Self {
        if skip == 0 {
            Self::None
        } else {
            Self::PartialPageSkip { skip }
        }
    }
}

/// Persisted progress of one job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub job_id: JobId,
    pub direction: Direction,
    /// Number of fully completed pages
    pub stage: u32,
    pub total_items: u64,
    pub processed_items: u64,
    /// Percentage 0..=100
    pub progress: u8,
    #[serde(default)]
    pub stage_data: StageData,
    #[serde(default)]
    pub status: JobStatus,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(job_id: JobId, direction: Direction) -> Self {
        Self {
            job_id,
            direction,
            stage: 0,
            total_items: 0,
            processed_items: 0,
            progress: 0,
            stage_data: StageData::None,
            status: JobStatus::NotStarted,
            updated_at: Utc::now(),
        }
    }

    /// Record the job's total; only the first non-zero total is kept
    pub fn set_total_once(&mut self, total: u64) {
        if self.total_items == 0 {
            self.total_items = total;
        }
        self.clamp_processed();
    }

    /// Reset the processed counter, e.g. to the first record of a resumed page
    pub fn set_processed(&mut self, processed: u64) {
        self.processed_items = processed;
        self.clamp_processed();
    }

    /// Count one more processed record
    pub fn record_processed(&mut self) {
        self.processed_items += 1;
        self.clamp_processed();
    }

    /// Mark the current page as done; clears any partial-page state
    pub fn advance_stage(&mut self) {
        self.stage += 1;
        self.stage_data = StageData::None;
    }

    pub fn complete(&mut self) {
        self.progress = 100;
        self.stage_data = StageData::None;
        self.status = JobStatus::Completed;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn clamp_processed(&mut self) {
        self.processed_items = self.processed_items.min(self.total_items);
        self.progress = percent(self.processed_items, self.total_items);
    }
}

fn percent(processed: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((processed.min(total) * 100) / total) as u8
}
