//! Configuration for the portable tool
//!
//! Settings are layered, later layers winning:
//!
//! 1. Hardcoded defaults
//! 2. TOML file (`--config`, or `config.toml` in the data directory)
//! 3. Environment variables (`PORTABLE_*`)
//!
//! Validation collects every problem before failing so a broken file is
//! reported in one go.

pub mod loader;

pub use loader::{load_config, load_config_with};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::checkpoint::JobId;
use crate::error::PortableError;
use crate::storage::{default_data_dir, StorageResult};
use crate::transfer::{TransferSettings, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_PAGE_SIZE};

/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 100_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortableConfig {
    /// Root for checkpoints, staging and the default destination document
    pub data_dir: Option<PathBuf>,

    /// Users read per page
    pub page_size: u32,

    /// Records between intermediate checkpoint saves
    pub checkpoint_interval: u64,

    /// Scope used when a command does not name one
    pub default_scope_id: i32,
}

impl Default for PortableConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            default_scope_id: 0,
        }
    }
}

impl PortableConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.data_dir().join("checkpoints")
    }

    fn staging_root(&self) -> PathBuf {
        self.data_dir().join("staging")
    }

    /// Staged records of one export job
    pub fn staging_dir(&self, export_job: &JobId) -> StorageResult<PathBuf> {
        Ok(self.staging_root().join(export_job.file_name()?))
    }

    pub fn destination_path(&self) -> PathBuf {
        self.data_dir().join("destination.json")
    }

    pub fn transfer_settings(&self) -> TransferSettings {
        TransferSettings {
            page_size: self.page_size,
            checkpoint_interval: self.checkpoint_interval,
        }
    }

    /// Apply `PORTABLE_*` overrides read through `lookup`
    ///
    /// Values that do not parse are reported by [`validate`](Self::validate)
    /// rather than silently dropped.
    pub fn merge_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut errors = Vec::new();

        if let Some(dir) = lookup("PORTABLE_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup("PORTABLE_PAGE_SIZE") {
            match value.parse() {
                Ok(size) => self.page_size = size,
                Err(_) => errors.push(format!("PORTABLE_PAGE_SIZE is not a number: {:?}", value)),
            }
        }
        if let Some(value) = lookup("PORTABLE_CHECKPOINT_INTERVAL") {
            match value.parse() {
                Ok(interval) => self.checkpoint_interval = interval,
                Err(_) => errors.push(format!(
                    "PORTABLE_CHECKPOINT_INTERVAL is not a number: {:?}",
                    value
                )),
            }
        }
        if let Some(value) = lookup("PORTABLE_SCOPE_ID") {
            match value.parse() {
                Ok(scope) => self.default_scope_id = scope,
                Err(_) => errors.push(format!("PORTABLE_SCOPE_ID is not a number: {:?}", value)),
            }
        }

        errors
    }

    pub fn merge_env_vars(&mut self) -> Vec<String> {
        self.merge_env_with(|key| std::env::var(key).ok())
    }

    /// All problems with the current values
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            errors.push(format!(
                "page_size must be between 1 and {} (got {})",
                MAX_PAGE_SIZE, self.page_size
            ));
        }
        if self.checkpoint_interval == 0 {
            errors.push("checkpoint_interval must be greater than 0".to_string());
        }
        if let Some(dir) = &self.data_dir {
            if dir.as_os_str().is_empty() {
                errors.push("data_dir cannot be empty when provided".to_string());
            }
        }

        errors
    }

    pub fn validate(&self) -> Result<(), PortableError> {
        into_result(self.validation_errors())
    }
}

pub(crate) fn into_result(errors: Vec<String>) -> Result<(), PortableError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(PortableError::Configuration(errors.join("; ")))
    }
}
