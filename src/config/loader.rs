use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use super::{into_result, PortableConfig};
use crate::error::{PortableError, Result};
use crate::storage::default_data_dir;

const CONFIG_FILE: &str = "config.toml";

/// Load configuration from file and process environment
///
/// An explicit `path` must exist; the default `config.toml` in the data
/// directory is optional.
pub async fn load_config(path: Option<&Path>) -> Result<PortableConfig> {
    load_config_with(path, |key| std::env::var(key).ok()).await
}

/// [`load_config`] with an injectable environment
pub async fn load_config_with(
    path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<PortableConfig> {
    let mut config = match path {
        Some(path) => {
            if !fs::try_exists(path).await? {
                return Err(PortableError::NotFound(format!(
                    "config file {}",
                    path.display()
                )));
            }
            read_file(path).await?
        }
        None => {
            let default_path = env("PORTABLE_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir)
                .join(CONFIG_FILE);
            if fs::try_exists(&default_path).await.unwrap_or(false) {
                read_file(&default_path).await?
            } else {
                PortableConfig::default()
            }
        }
    };

    let mut errors = config.merge_env_with(env);
    errors.extend(config.validation_errors());
    into_result(errors)?;

    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

async fn read_file(path: &Path) -> Result<PortableConfig> {
    debug!("Reading configuration from {}", path.display());
    let content = fs::read_to_string(path).await?;
    Ok(toml::from_str(&content)?)
}
