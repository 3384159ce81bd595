//! Command implementations

pub mod export;
pub mod import;
pub mod reset;
pub mod status;

pub use export::{run_export_command, ExportArgs};
pub use import::{run_import_command, ImportArgs};
pub use reset::run_reset_command;
pub use status::run_status_command;

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::checkpoint::{FileCheckpointStore, JobId};
use crate::config::PortableConfig;
use crate::error::PortableError;
use crate::staging::FileStagingRepository;
use crate::transfer::{cancel_on_ctrl_c, UsersTransfer};

/// Orchestrator over the file-backed stores in the data directory
///
/// Staging is the directory of `export_job`: the export writing it, or the
/// export an import reads from.
async fn open_transfer(config: &PortableConfig, export_job: &JobId) -> Result<UsersTransfer> {
    let checkpoints = FileCheckpointStore::new(config.checkpoint_dir());
    let dir = config
        .staging_dir(export_job)
        .map_err(|e| PortableError::Configuration(e.to_string()))?;
    let staging = FileStagingRepository::open(&dir)
        .await
        .with_context(|| format!("Failed to open staging directory {}", dir.display()))?;

    Ok(
        UsersTransfer::new(Arc::new(checkpoints), Arc::new(staging), config.transfer_settings())
            .with_cancel_signal(cancel_on_ctrl_c()),
    )
}
