use anyhow::Result;

use crate::checkpoint::{Checkpoint, CheckpointStore, FileCheckpointStore, JobId};
use crate::config::PortableConfig;
use crate::error::PortableError;

pub async fn run_status_command(
    job_id: Option<String>,
    json: bool,
    config: &PortableConfig,
) -> Result<()> {
    let store = FileCheckpointStore::new(config.checkpoint_dir());

    let checkpoints = match job_id {
        Some(id) => {
            let id = JobId::from_string(id);
            let checkpoint = store
                .load(&id)
                .await?
                .ok_or_else(|| PortableError::NotFound(format!("checkpoint for job {}", id)))?;
            vec![checkpoint]
        }
        None => store.list().await?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&checkpoints)?);
    } else if checkpoints.is_empty() {
        println!("No jobs found in {}", store.base_path().display());
    } else {
        for checkpoint in &checkpoints {
            println!("{}", format_checkpoint(checkpoint));
        }
    }
    Ok(())
}

fn format_checkpoint(checkpoint: &Checkpoint) -> String {
    let mut line = format!(
        "{:<40} {:<6} {:<11} stage {:>4}  {:>8}/{:<8} {:>3}%  updated {}",
        checkpoint.job_id.as_str(),
        checkpoint.direction.to_string(),
        checkpoint.status.to_string(),
        checkpoint.stage,
        checkpoint.processed_items,
        checkpoint.total_items,
        checkpoint.progress,
        checkpoint.updated_at.format("%Y-%m-%d %H:%M:%S")
    );
    let skip = checkpoint.stage_data.skip();
    if skip > 0 {
        line.push_str(&format!("  (+{} into next page)", skip));
    }
    line
}
