use anyhow::Result;
use clap::Parser;
use tracing::debug;

use portable::app::{handle_fatal_error, init_logging, AppConfig};
use portable::cli::{execute_command, Cli, Commands};
use portable::config::load_config;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let verbose = cli.verbose;

    let app_config = match AppConfig::new(verbose) {
        Ok(config) => config.with_config_path(cli.config),
        Err(e) => handle_fatal_error(e, verbose),
    };
    init_logging(&app_config);

    if let Err(e) = run(cli.command, &app_config).await {
        handle_fatal_error(e, verbose);
    }
}

async fn run(command: Commands, app_config: &AppConfig) -> Result<()> {
    let config = load_config(app_config.config_path.as_deref()).await?;
    debug!("Using data directory {}", config.data_dir().display());
    execute_command(command, &config).await
}
