#![warn(missing_docs)]
//! # geo-courier-store
//!
//! ## Purpose
//! Defines the durable key-value store boundary used for identity, session,
//! and last-known-location persistence.
//!
//! ## Responsibilities
//! - Expose a backend-agnostic [`DurableStore`] trait.
//! - Provide an in-memory store for tests and headless runs.
//! - Provide a single-document JSON file store for process-independent
//!   persistence.
//!
//! ## Data flow
//! Identity, session, and relay facades read and overwrite individual scalar
//! keys. The store offers no transactions across keys; the last writer wins
//! per key.
//!
//! ## Ownership and lifetimes
//! Values are owned `String`s; callers never borrow store internals.
//!
//! ## Error model
//! Backend read/write/codec failures are reported as [`StoreError`] values.
//!
//! ## Security and privacy notes
//! Stored values (user id, coordinates) are never logged by this crate.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;

/// Trait implemented by concrete durable key-value stores.
///
/// Mirrors the platform store contract: process-independent persistence of
/// independent scalar values with no cross-key guarantees.
pub trait DurableStore: Send + Sync {
    /// Reads the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrites the value stored under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be written.
    fn put(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removes the value stored under `key`, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store used by tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Single-document JSON file store.
///
/// The whole key-value map is loaded at open and rewritten on every mutation.
/// Suitable for the handful of scalar keys this system persists.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileStore {
    /// Opens (or creates) a file store at `path`.
    ///
    /// # Errors
    /// Returns [`StoreError::Io`] when an existing file cannot be read and
    /// [`StoreError::Codec`] when its contents are not a valid JSON map.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|error| StoreError::Io(path.display().to_string(), error.to_string()))?;
            serde_json::from_str(&raw).map_err(StoreError::Codec)?
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Returns the backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(entries).map_err(StoreError::Codec)?;
        fs::write(&self.path, encoded)
            .map_err(|error| StoreError::Io(self.path.display().to_string(), error.to_string()))
    }
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().map_err(|_| StoreError::Poisoned)?;
        entries.remove(key);
        self.persist(&entries)
    }
}

/// Store layer error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend file could not be read or written.
    #[error("store io failure at '{0}': {1}")]
    Io(String, String),
    /// Backend document could not be encoded or decoded.
    #[error("store codec failure: {0}")]
    Codec(#[from] serde_json::Error),
    /// Interior lock was poisoned by a panicking writer.
    #[error("store lock poisoned")]
    Poisoned,
}

#[cfg(test)]
mod tests {
    //! Unit tests for overwrite semantics.

    use super::*;

    #[test]
    fn memory_store_last_writer_wins() {
        let store = MemoryStore::new();
        store.put("location", "a").expect("put should work");
        store.put("location", "b").expect("put should work");
        assert_eq!(
            store.get("location").expect("get should work").as_deref(),
            Some("b")
        );

        store.remove("location").expect("remove should work");
        assert!(store.get("location").expect("get should work").is_none());
    }
}
