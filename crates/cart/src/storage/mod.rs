//! Durable key-value storage for cart snapshots.
//!
//! The cart is stored as one text blob (a JSON array of products) under a
//! single namespaced key; there is no per-product key scheme.
//!
//! # Backends
//!
//! - [`MemoryStore`] - process-local map, lost on exit
//! - [`FileStore`] - one JSON object file holding every key, replaced atomically

mod file;
mod memory;

use std::sync::Arc;

use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Key the cart snapshot is stored under unless configured otherwise.
pub const DEFAULT_CART_KEY: &str = "@RocketShoes:cart";

/// Errors that can occur when reading or writing storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backing file could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Backend refused the operation.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Text storage that survives process restarts.
pub trait PersistentStore: Send + Sync {
    /// Read the value under `key`, or `None` if nothing was stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value under `key`.
    ///
    /// A failed write must leave the previous value readable.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the value was not stored.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

impl<T: PersistentStore + ?Sized> PersistentStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }
}
