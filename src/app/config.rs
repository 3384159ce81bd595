//! Application configuration
//!
//! Process-level settings taken from the command line, as opposed to the
//! tool settings in [`crate::config`].

use anyhow::Result;
use std::path::PathBuf;

/// Application configuration structure
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Verbosity level for logging
    pub verbose: u8,
    /// Directory the process was started from
    pub working_dir: PathBuf,
    /// Explicit tool configuration file, absolute
    pub config_path: Option<PathBuf>,
}

impl AppConfig {
    /// Create a new application configuration
    pub fn new(verbose: u8) -> Result<Self> {
        let working_dir = std::env::current_dir()
            .map_err(|e| anyhow::anyhow!("Failed to get current directory: {}", e))?;

        Ok(Self {
            verbose,
            working_dir,
            config_path: None,
        })
    }

    /// Set the `--config` file; relative paths are taken from the working directory
    pub fn with_config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path.map(|path| {
            if path.is_relative() {
                self.working_dir.join(path)
            } else {
                path
            }
        });
        self
    }

    /// Get the log level string based on verbosity
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            2 => "trace",
            _ => "trace,tokio=debug",
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            verbose: 0,
            working_dir: PathBuf::from("."),
            config_path: None,
        }
    }
}
