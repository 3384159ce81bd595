//! Storage primitives shared by the file-backed stores
//!
//! Checkpoints, staged records and the destination snapshot are all plain JSON
//! documents on disk. Writes go through a temp file and a rename so a crash
//! never leaves a half-written document behind.

pub mod error;

pub use error::{StorageError, StorageResult};

use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Default data directory (`~/.local/share/portable` or the platform equivalent)
pub fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "portable")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".portable"))
}

/// Read and deserialize a JSON document, `None` when the file does not exist
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> StorageResult<Option<T>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StorageError::Io(e)),
    }
}

/// Serialize and write a JSON document atomically
pub async fn write_json_atomic<T: Serialize>(path: &Path, data: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let json = serde_json::to_vec_pretty(data)?;
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, &json).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}
