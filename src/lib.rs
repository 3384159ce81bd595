//! # portable
//!
//! Checkpointed, resumable export and import of user accounts.
//!
//! ## Usage
//!
//! ```bash
//! portable export --source users.json --job-id nightly
//! portable import --collision overwrite --job-id nightly-import
//! portable status
//! ```
//!
//! ## Modules
//!
//! - `model` - User records and their related sub-records
//! - `source` - Paginated, time-windowed reads from a source store
//! - `staging` - Durable buffer between export and import
//! - `destination` - Target store the import writes into
//! - `checkpoint` - Persisted job progress for resume after interruption
//! - `transfer` - Export and import orchestration, collision handling, summaries
//! - `config` - Layered tool configuration
//! - `app` / `cli` - Binary front end
pub mod app;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod destination;
pub mod error;
pub mod model;
pub mod source;
pub mod staging;
pub mod storage;
pub mod transfer;

pub use error::{PortableError, Result};
