use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::info;

use super::open_transfer;
use crate::config::PortableConfig;
use crate::source::{MemorySource, SourceSnapshot};
use crate::transfer::{Job, JobDefinition};

#[derive(Debug, Clone)]
pub struct ExportArgs {
    pub source: PathBuf,
    pub job_id: Option<String>,
    pub scope: Option<i32>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub include_deleted: bool,
}

pub async fn run_export_command(args: ExportArgs, config: &PortableConfig) -> Result<()> {
    let job = Job::try_from(JobDefinition {
        id: args.job_id,
        kind: "export".to_string(),
        scope_id: args.scope.unwrap_or(config.default_scope_id),
        from: args.from,
        to: args.to,
        include_deleted: args.include_deleted,
        collision_resolution: None,
    })?;

    let snapshot = SourceSnapshot::load(&args.source)
        .await
        .with_context(|| format!("Failed to load source snapshot {}", args.source.display()))?;
    let source = MemorySource::new(snapshot);

    info!("Exporting scope {} as job {}", job.scope_id, job.id);
    let transfer = open_transfer(config, &job.id).await?;
    let summary = transfer.export(&job, &source).await?;

    print!("{summary}");
    Ok(())
}
