#![warn(missing_docs)]
//! # geo-courier-identity
//!
//! ## Purpose
//! Implements user-identity and collection-session lifecycle handling for
//! `geo-courier`.
//!
//! ## Responsibilities
//! - Load and bind the persisted user identifier.
//! - Own the active/inactive collect-id toggle that gates transmission.
//!
//! ## Data flow
//! The host shell binds user input through [`IdentityManager::bind`]. The
//! bridge protocol handler toggles [`SessionState`] in response to
//! web-originated messages. The relay reads both to decide whether a sample
//! is transmitted.
//!
//! ## Ownership and lifetimes
//! Both facades are thin handles over a shared [`DurableStore`]; all state
//! lives in the store so restarts resume the persisted identity and session.
//!
//! ## Error model
//! Persistence failures surface as [`IdentityError`]. Binding errors are
//! reported to the caller for user-visible handling; session reads treat
//! corrupt values as "no active session".
//!
//! ## Security and privacy notes
//! User identifiers are opaque; this crate never logs their values.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use geo_courier_identity::SessionState;
//! use geo_courier_store::MemoryStore;
//!
//! let session = SessionState::new(Arc::new(MemoryStore::new()));
//! session.start_collect(42).expect("session should persist");
//! session.stop_collect().expect("session should clear");
//! assert!(session.active_collect().expect("read should work").is_none());
//! ```

use std::sync::Arc;

use geo_courier_core::{CoreError, KEY_COLLECT_ID, KEY_USER_ID, UserId};
use geo_courier_store::{DurableStore, StoreError};
use thiserror::Error;

/// Owns the user-id lifecycle: load at startup, bind via user input, persist.
#[derive(Clone)]
pub struct IdentityManager {
    store: Arc<dyn DurableStore>,
}

impl IdentityManager {
    /// Creates an identity manager over the injected store.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Reads the persisted identifier.
    ///
    /// Returns `None` when no identifier was ever bound; an empty stored
    /// value counts as unbound. No side effects.
    ///
    /// # Errors
    /// Returns [`IdentityError::Store`] when the store cannot be read.
    pub fn load(&self) -> Result<Option<UserId>, IdentityError> {
        match self.store.get(KEY_USER_ID)? {
            Some(raw) if !raw.trim().is_empty() => Ok(Some(UserId::new(raw)?)),
            _ => Ok(None),
        }
    }

    /// Validates and persists a candidate identifier.
    ///
    /// # Errors
    /// Returns [`IdentityError::Invalid`] for blank input and
    /// [`IdentityError::Store`] when the write fails; the caller reports
    /// persistence failures to the user. No retry is attempted.
    pub fn bind(&self, candidate: impl Into<String>) -> Result<UserId, IdentityError> {
        let user_id = UserId::new(candidate)?;
        self.store.put(KEY_USER_ID, user_id.as_str())?;
        Ok(user_id)
    }
}

/// Owns the active/inactive collect-id toggle.
///
/// These are the only mutators of the collect id, and they are invoked
/// exclusively by the bridge protocol handler; the sampler never touches
/// session state.
#[derive(Clone)]
pub struct SessionState {
    store: Arc<dyn DurableStore>,
}

impl SessionState {
    /// Creates a session facade over the injected store.
    pub fn new(store: Arc<dyn DurableStore>) -> Self {
        Self { store }
    }

    /// Persists `id` as the active collection session.
    ///
    /// Any `i64` is accepted as-is, zero and negative values included; the
    /// collection server owns id semantics.
    ///
    /// # Errors
    /// Returns [`IdentityError::Store`] when the write fails.
    pub fn start_collect(&self, id: i64) -> Result<(), IdentityError> {
        self.store.put(KEY_COLLECT_ID, &id.to_string())?;
        Ok(())
    }

    /// Clears the active collection session.
    ///
    /// The cleared state is persisted as an empty string, matching the
    /// platform store contract.
    ///
    /// # Errors
    /// Returns [`IdentityError::Store`] when the write fails.
    pub fn stop_collect(&self) -> Result<(), IdentityError> {
        self.store.put(KEY_COLLECT_ID, "")?;
        Ok(())
    }

    /// Reads the active collect id, if any.
    ///
    /// Empty or missing values mean no active session. A stored value that
    /// does not parse as an integer is treated as no active session and
    /// logged, never surfaced as an error.
    ///
    /// # Errors
    /// Returns [`IdentityError::Store`] when the store cannot be read.
    pub fn active_collect(&self) -> Result<Option<i64>, IdentityError> {
        let raw = match self.store.get(KEY_COLLECT_ID)? {
            Some(raw) if !raw.is_empty() => raw,
            _ => return Ok(None),
        };

        match raw.parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                tracing::warn!("stored collect id is not an integer; treating as inactive");
                Ok(None)
            }
        }
    }
}

/// Errors produced by identity and session facades.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Candidate identifier violated validation rules.
    #[error("invalid user id: {0}")]
    Invalid(#[from] CoreError),
    /// Durable store read/write failure.
    #[error("identity store failure: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for identity binding and session toggling.

    use std::sync::Arc;

    use geo_courier_store::MemoryStore;

    use super::*;

    #[test]
    fn bind_rejects_blank_candidates() {
        let identity = IdentityManager::new(Arc::new(MemoryStore::new()));
        assert!(matches!(
            identity.bind("   "),
            Err(IdentityError::Invalid(_))
        ));
    }

    #[test]
    fn bound_identity_survives_reload() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let identity = IdentityManager::new(store.clone());
        assert!(identity.load().expect("load should work").is_none());

        identity.bind("rider-7").expect("bind should persist");
        let reloaded = IdentityManager::new(store)
            .load()
            .expect("load should work")
            .expect("identity should be bound");
        assert_eq!(reloaded.as_str(), "rider-7");
    }

    #[test]
    fn corrupt_collect_id_reads_as_inactive() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        store
            .put(KEY_COLLECT_ID, "not-a-number")
            .expect("put should work");

        let session = SessionState::new(store);
        assert!(session.active_collect().expect("read should work").is_none());
    }
}
