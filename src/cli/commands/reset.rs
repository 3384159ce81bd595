use anyhow::{Context, Result};
use tracing::info;

use crate::checkpoint::{CheckpointStore, FileCheckpointStore, JobId};
use crate::config::PortableConfig;
use crate::error::PortableError;

pub async fn run_reset_command(job_id: String, staging: bool, config: &PortableConfig) -> Result<()> {
    let store = FileCheckpointStore::new(config.checkpoint_dir());
    let id = JobId::from_string(job_id);
    store.delete(&id).await?;
    println!("Reset job {}", id);

    if staging {
        let dir = config
            .staging_dir(&id)
            .map_err(|e| PortableError::Configuration(e.to_string()))?;
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => info!("Removed staging directory {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to remove staging directory {}", dir.display())
                })
            }
        }
        println!("Cleared staging of {} at {}", id, dir.display());
    }
    Ok(())
}
