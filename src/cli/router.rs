//! Command routing and execution

use anyhow::Result;

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::PortableConfig;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands, config: &PortableConfig) -> Result<()> {
    match command {
        Commands::Export {
            source,
            job_id,
            scope,
            from,
            to,
            include_deleted,
        } => {
            run_export_command(
                ExportArgs {
                    source,
                    job_id,
                    scope,
                    from,
                    to,
                    include_deleted,
                },
                config,
            )
            .await
        }
        Commands::Import {
            destination,
            job_id,
            from_job,
            scope,
            collision,
        } => {
            run_import_command(
                ImportArgs {
                    destination,
                    job_id,
                    from_job,
                    scope,
                    collision,
                },
                config,
            )
            .await
        }
        Commands::Status { job_id, json } => run_status_command(job_id, json, config).await,
        Commands::Reset { job_id, staging } => run_reset_command(job_id, staging, config).await,
    }
}
