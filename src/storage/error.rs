//! Errors raised by the checkpoint, staging and destination stores

use std::fmt;
use thiserror::Error;

pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A stored document or staged record could not be encoded or decoded
    #[error("malformed document: {0}")]
    Serialization(String),

    #[error("{0} does not exist")]
    NotFound(String),

    /// A write would give two records the same natural key
    #[error("key conflict: {0}")]
    Conflict(String),

    /// The backing store cannot be reached right now
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("invalid store location: {0}")]
    Configuration(String),
}

impl StorageError {
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    pub fn not_found<E: fmt::Display>(item: E) -> Self {
        Self::NotFound(item.to_string())
    }

    pub fn conflict<E: fmt::Display>(msg: E) -> Self {
        Self::Conflict(msg.to_string())
    }

    pub fn unavailable<E: fmt::Display>(msg: E) -> Self {
        Self::Unavailable(msg.to_string())
    }

    pub fn configuration<E: fmt::Display>(msg: E) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Whether running the same job again may get past this error
    ///
    /// Lost connections and I/O hiccups qualify; bad data and key conflicts
    /// fail the same way on every attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_) | Self::Unavailable(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}
