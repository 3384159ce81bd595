use thiserror::Error;

use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum PortableError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Source store error: {0}")]
    Source(#[source] StorageError),

    #[error("Destination store error: {0}")]
    Destination(#[source] StorageError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl PortableError {
    /// Failures a caller may re-invoke the job for; the checkpoint bounds redone work
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) | Self::Source(e) | Self::Destination(e) => e.is_retryable(),
            Self::Io(_) => true,
            _ => false,
        }
    }

    /// Process exit status for the command line front end
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Validation(_) | Self::Toml(_) => 2,
            Self::NotFound(_) => 3,
            _ if self.is_transient() => 75,
            _ => 1,
        }
    }
}

impl From<String> for PortableError {
    fn from(s: String) -> Self {
        PortableError::Validation(s)
    }
}

pub type Result<T> = std::result::Result<T, PortableError>;
