//! Session-scoped key-value storage
//!
//! Backends mirror browser `sessionStorage` semantics: string keys, string
//! values, gone when the browser session ends. Every operation is fallible so
//! callers decide how to degrade.

pub mod cookie;
pub mod memory;

pub use cookie::CookieSessionStorage;
pub use memory::MemorySessionStorage;

use thiserror::Error;

/// Failure of the underlying storage primitive
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage cannot be used at all (disabled, poisoned lock, quota)
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
    /// A stored value exists but cannot be read back
    #[error("stored value for '{key}' is unreadable: {reason}")]
    Corrupted { key: String, reason: String },
    /// A value could not be encoded for storage
    #[error("failed to encode value for '{key}': {reason}")]
    Encoding { key: String, reason: String },
}

/// `setItem`/`getItem`/`removeItem` over a session-scoped store
pub trait SessionStorage: Send + Sync {
    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Read the value under `key`, `Ok(None)` when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Remove the value under `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the removal
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}
