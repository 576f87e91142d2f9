//! Durable storage adapters for the session.

mod file_storage;
mod memory_storage;

pub use file_storage::{FileStorage, SESSION_FILE};
pub use memory_storage::MemoryStorage;
