//! Snapshot persistence port for the cart store.
//!
//! The cart store never talks to a concrete storage mechanism. It writes
//! serialized [`CartSnapshot`]s through a [`SnapshotStorage`] implementation:
//! [`MemoryStorage`] here, a file-backed store in the storefront crate, or any
//! fake a test wants to inject.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use thiserror::Error;

use crate::cart::CartSnapshot;
use crate::types::CartId;

/// Fixed namespace key for persisted carts.
pub const CART_STORAGE_KEY: &str = "cart:v1";

/// Storage key for a session cart: `cart:v1:<cart-id>`.
#[must_use]
pub fn cart_key(cart_id: &CartId) -> String {
    format!("{CART_STORAGE_KEY}:{cart_id}")
}

/// Errors a storage backend can report.
///
/// The cart store treats all of these as non-fatal: they are logged and the
/// in-memory cart stays authoritative.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend is not reachable or has been disabled.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Writing the value would exceed the backend's capacity.
    #[error("storage quota of {limit} bytes exceeded")]
    QuotaExceeded {
        /// Capacity of the backend in bytes.
        limit: usize,
    },

    /// Underlying I/O failed.
    #[error("storage I/O error: {0}")]
    Io(String),

    /// Snapshot could not be encoded or decoded.
    #[error("snapshot serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable key-value storage for serialized snapshots.
///
/// Calls are synchronous: a successful `save` means the value is durable as
/// far as the backend can promise.
pub trait SnapshotStorage: Send + Sync {
    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the write.
    fn save(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete the value under `key`. Deleting an absent key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: SnapshotStorage + ?Sized> SnapshotStorage for Arc<T> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Serialize a snapshot to its persisted JSON form.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode_snapshot(snapshot: &CartSnapshot) -> Result<String, StorageError> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Parse a persisted JSON snapshot.
///
/// # Errors
///
/// Returns an error if `raw` is not a valid snapshot.
pub fn decode_snapshot(raw: &str) -> Result<CartSnapshot, StorageError> {
    Ok(serde_json::from_str(raw)?)
}

// =============================================================================
// MemoryStorage
// =============================================================================

/// In-process storage backend.
///
/// Clones share the same underlying map, so a test can keep one handle to
/// inspect what a store persisted through another. An optional byte quota and
/// an availability switch let tests exercise the failure paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
    quota: Option<usize>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStorage {
    /// Create an empty, unbounded storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty storage that rejects values larger than `limit` bytes.
    #[must_use]
    pub fn with_quota(limit: usize) -> Self {
        Self {
            quota: Some(limit),
            ..Self::default()
        }
    }

    /// Make every subsequent call fail with [`StorageError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "memory storage disabled".to_string(),
            ));
        }
        Ok(())
    }
}

impl SnapshotStorage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_available()?;
        let entries = self
            .entries
            .read()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_available()?;
        if let Some(limit) = self.quota
            && value.len() > limit
        {
            return Err(StorageError::QuotaExceeded { limit });
        }
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| StorageError::Unavailable("memory storage lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}
