//! Checkpointed export and import of users
//!
//! [`UsersTransfer`] drives both directions. Export reads pages from a
//! [`SourceStore`](crate::source::SourceStore) into staging, import replays
//! staging into a [`DestinationStore`](crate::destination::DestinationStore).
//! Both persist a [`Checkpoint`] as they go and pick up from it when re-run
//! with the same job id.

pub mod cancel;
mod export;
mod import;
pub mod job;
pub mod reconcile;
pub mod summary;

pub use cancel::{cancel_on_ctrl_c, CancelSignal};
pub use job::{CollisionResolution, Job, JobDefinition, JobKind};
pub use summary::{EntityCounts, LogEntry, ResultSummary, SummaryItem};

use std::sync::Arc;
use tracing::{info, warn};

use crate::checkpoint::{load_or_new, Checkpoint, CheckpointStore, JobStatus};
use crate::error::{PortableError, Result};
use crate::staging::StagingRepository;

/// Default number of users per page
pub const DEFAULT_PAGE_SIZE: u32 = 1000;
/// Default number of records between intermediate checkpoint saves
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSettings {
    pub page_size: u32,
    pub checkpoint_interval: u64,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
        }
    }
}

impl TransferSettings {
    fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(PortableError::Configuration(
                "page_size must be greater than 0".to_string(),
            ));
        }
        if self.checkpoint_interval == 0 {
            return Err(PortableError::Configuration(
                "checkpoint_interval must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the record at this running position triggers an intermediate save
    pub fn is_checkpoint_due(&self, position: u64) -> bool {
        position > 0 && position % self.checkpoint_interval == 0
    }
}

/// How the page loop ended when it did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunOutcome {
    Completed,
    Cancelled,
}

/// Orchestrates export and import jobs over a staging repository
pub struct UsersTransfer {
    checkpoints: Arc<dyn CheckpointStore>,
    staging: Arc<dyn StagingRepository>,
    settings: TransferSettings,
    cancel: CancelSignal,
}

impl UsersTransfer {
    pub fn new(
        checkpoints: Arc<dyn CheckpointStore>,
        staging: Arc<dyn StagingRepository>,
        settings: TransferSettings,
    ) -> Self {
        Self {
            checkpoints,
            staging,
            settings,
            cancel: CancelSignal::new(),
        }
    }

    pub fn with_cancel_signal(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_signal(&self) -> CancelSignal {
        self.cancel.clone()
    }

    /// Checkpoint of `job`, refusing one left by a job of the other direction
    async fn load_checkpoint(&self, job: &Job) -> Result<Checkpoint> {
        let direction = job.kind.direction();
        let checkpoint = load_or_new(self.checkpoints.as_ref(), &job.id, direction).await?;
        if checkpoint.direction != direction {
            return Err(PortableError::Configuration(format!(
                "Job id {} belongs to an {} job and cannot be reused for an {}",
                job.id, checkpoint.direction, direction
            )));
        }
        Ok(checkpoint)
    }

    /// Persist progress; a failed save is logged and the run goes on
    async fn save_checkpoint(&self, checkpoint: &mut Checkpoint, summary: &mut ResultSummary) {
        checkpoint.touch();
        if let Err(e) = self.checkpoints.save(checkpoint).await {
            warn!(
                "Failed to save checkpoint for job {} at stage {}: {}",
                checkpoint.job_id, checkpoint.stage, e
            );
            summary.add_log_entry("Checkpoint save failed", e.to_string());
        }
    }

    /// Common end of every run: settle the status, save, and hand back the summary
    async fn finish(
        &self,
        mut checkpoint: Checkpoint,
        mut summary: ResultSummary,
        outcome: Result<RunOutcome>,
    ) -> Result<ResultSummary> {
        let status = match &outcome {
            Ok(RunOutcome::Completed) => {
                checkpoint.complete();
                JobStatus::Completed
            }
            Ok(RunOutcome::Cancelled) => JobStatus::Cancelled,
            Err(_) => JobStatus::Failed,
        };
        checkpoint.status = status;
        self.save_checkpoint(&mut checkpoint, &mut summary).await;
        summary.finish(status);

        match outcome {
            Ok(_) => {
                info!(
                    "Job {} {} at stage {} ({}/{} records, {}%)",
                    checkpoint.job_id,
                    status,
                    checkpoint.stage,
                    checkpoint.processed_items,
                    checkpoint.total_items,
                    checkpoint.progress
                );
                Ok(summary)
            }
            Err(e) => {
                warn!("Job {} failed: {}\n{}", checkpoint.job_id, e, summary);
                Err(e)
            }
        }
    }
}
