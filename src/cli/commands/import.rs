use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use super::open_transfer;
use crate::checkpoint::{CheckpointStore, Direction, FileCheckpointStore, JobId, JobStatus};
use crate::config::PortableConfig;
use crate::destination::FileDestination;
use crate::error::PortableError;
use crate::transfer::{Job, JobDefinition};

#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub destination: Option<PathBuf>,
    pub job_id: Option<String>,
    /// Export job whose staged records are imported
    pub from_job: String,
    pub scope: Option<i32>,
    pub collision: String,
}

pub async fn run_import_command(args: ImportArgs, config: &PortableConfig) -> Result<()> {
    // Parse before opening anything so a bad policy never touches the destination
    let job = Job::try_from(JobDefinition {
        id: args.job_id,
        kind: "import".to_string(),
        scope_id: args.scope.unwrap_or(config.default_scope_id),
        collision_resolution: Some(args.collision),
        ..Default::default()
    })?;
    let from_job = JobId::from_string(args.from_job);
    check_export_job(config, &from_job).await?;

    let path = args
        .destination
        .unwrap_or_else(|| config.destination_path());
    let destination = FileDestination::open(&path)
        .await
        .with_context(|| format!("Failed to open destination {}", path.display()))?;

    info!(
        "Importing staging of {} into scope {} of {} as job {}",
        from_job,
        job.scope_id,
        destination.path().display(),
        job.id
    );
    let transfer = open_transfer(config, &from_job).await?;
    let summary = transfer.import(&job, &destination).await?;

    print!("{summary}");
    Ok(())
}

/// The staging an import reads must come from an export job of this data directory
async fn check_export_job(config: &PortableConfig, from_job: &JobId) -> Result<()> {
    from_job
        .file_name()
        .map_err(|e| PortableError::Configuration(e.to_string()))?;
    let store = FileCheckpointStore::new(config.checkpoint_dir());
    let checkpoint = store.load(from_job).await?.ok_or_else(|| {
        PortableError::NotFound(format!("No export job {} to import from", from_job))
    })?;

    if checkpoint.direction != Direction::Export {
        return Err(PortableError::Configuration(format!(
            "Job {} is an {} job; --from-job must name an export",
            from_job, checkpoint.direction
        ))
        .into());
    }
    if checkpoint.status != JobStatus::Completed {
        warn!(
            "Export job {} is {:?}; importing the {} users staged so far",
            from_job, checkpoint.status, checkpoint.processed_items
        );
    }
    Ok(())
}
