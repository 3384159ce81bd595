//! Staging repository implementations

pub mod file;
pub mod memory;

pub use file::FileStagingRepository;
pub use memory::MemoryStagingRepository;
