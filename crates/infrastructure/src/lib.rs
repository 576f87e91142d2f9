//! Pet Manager Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus configuration loading.

pub mod adapters;
pub mod persistence;
pub mod photo;
pub mod settings;

pub use adapters::ReqwestTransport;
pub use persistence::{FileStorage, MemoryStorage, SESSION_FILE};
pub use photo::{PhotoError, load_photo};
pub use settings::{AppConfig, ConfigError, DEFAULT_API_URL};
