//! CLI argument structures

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Export users into staging and import them elsewhere, resumably
#[derive(Parser)]
#[command(name = "portable")]
#[command(about = "portable - checkpointed user export and import", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file (defaults to config.toml in the data directory)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export users from a source snapshot into staging
    #[command(name = "export")]
    Export {
        /// Source snapshot (JSON) to read users from
        #[arg(short, long, value_name = "FILE")]
        source: PathBuf,

        /// Job id; re-use it to resume an interrupted export
        #[arg(short, long)]
        job_id: Option<String>,

        /// Scope (site) to export from
        #[arg(long)]
        scope: Option<i32>,

        /// Only users modified after this time (RFC 3339)
        #[arg(long)]
        from: Option<DateTime<Utc>>,

        /// Only users modified up to this time (RFC 3339, defaults to now)
        #[arg(long)]
        to: Option<DateTime<Utc>>,

        /// Include users marked as deleted
        #[arg(long)]
        include_deleted: bool,
    },

    /// Import staged users into a destination
    #[command(name = "import")]
    Import {
        /// Destination document (defaults to destination.json in the data directory)
        #[arg(short, long, value_name = "FILE")]
        destination: Option<PathBuf>,

        /// Job id; re-use it to resume an interrupted import
        #[arg(short, long)]
        job_id: Option<String>,

        /// Export job whose staged users are imported
        #[arg(long, value_name = "EXPORT_JOB_ID")]
        from_job: String,

        /// Scope (site) to import into
        #[arg(long)]
        scope: Option<i32>,

        /// What to do with users that already exist: overwrite or ignore
        #[arg(long, default_value = "ignore")]
        collision: String,
    },

    /// Show checkpoint state of one or all jobs
    #[command(name = "status")]
    Status {
        /// Job to show; all jobs when omitted
        job_id: Option<String>,

        /// Print checkpoints as JSON
        #[arg(long)]
        json: bool,
    },

    /// Forget a job's progress so it starts over
    #[command(name = "reset")]
    Reset {
        /// Job whose checkpoint is removed
        job_id: String,

        /// Also clear the records this job staged
        #[arg(long)]
        staging: bool,
    },
}
