//! Durable key-value storage port
//!
//! The session survives restarts through a small string key-value store,
//! shared by every running instance of the client.

use thiserror::Error;
use tokio::sync::broadcast;

/// Key holding the access token.
pub const TOKEN_KEY: &str = "token";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";
/// Key holding the JSON-encoded current user.
pub const CURRENT_USER_KEY: &str = "currentUser";
/// Every key the session occupies.
pub const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, REFRESH_TOKEN_KEY, CURRENT_USER_KEY];

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backing store cannot be used at all.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Notification that another handle changed the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// The key that changed.
    pub key: String,
    /// The new value, or None if the key was removed.
    pub new_value: Option<String>,
}

/// Port for the durable string store.
///
/// Operations are synchronous: the store is small and local, and the
/// token store calls it while publishing state changes.
pub trait DurableStorage: Send + Sync {
    /// Reads a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Writes a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removes a value. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribes to changes made through other handles on the same store.
    ///
    /// Returns None when the store has no notion of other handles.
    fn subscribe(&self) -> Option<broadcast::Receiver<StorageEvent>> {
        None
    }
}
