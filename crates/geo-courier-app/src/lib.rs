#![warn(missing_docs)]
//! # geo-courier-app
//!
//! ## Purpose
//! Orchestrates identity, session, sampling, relay, bridge, and shell state
//! for `geo-courier`.
//!
//! ## Responsibilities
//! - Assemble the application context from an injected store and transport.
//! - Drive startup screen selection and identity binding.
//! - Run the message-passing runtime that feeds sampler readings into the
//!   relay and bridge messages into the protocol handler.
//! - Read environment configuration with documented defaults.
//!
//! ## Data flow
//! Startup config + store -> [`AppContext`] -> [`runtime::Runtime`] worker.
//! Trigger runners and the embedding publish commands; the worker emits
//! relay outcomes and bridge responses as events.
//!
//! ## Ownership and lifetimes
//! The context owns shared facade handles; the runtime owns its worker and
//! trigger threads and tears them down on shutdown.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]. Identity-binding failures
//! surface to the embedding for user-visible reporting; runtime-internal
//! failures are logged and absorbed per the fire-and-forget contract.
//!
//! ## Security and privacy notes
//! Configuration values may include deployment hosts; user ids and
//! coordinates are never logged by orchestration code.

pub mod runtime;

use std::path::PathBuf;
use std::sync::Arc;

use geo_courier_bridge::BridgeHandler;
use geo_courier_dispatch::{COLLECT_ENDPOINT_PATH, DispatchClient, DispatchError, LocationRelay};
use geo_courier_identity::{IdentityError, IdentityManager, SessionState};
use geo_courier_sampler::{DEFAULT_DEFERRAL_INTERVAL_MS, PermissionGrant, SamplerError};
use geo_courier_shell::{ShellError, ShellState};
use geo_courier_store::{DurableStore, StoreError};
use thiserror::Error;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("GEO_COURIER_VERSION");

/// Default hosted-content domain for development deployments.
pub const DEFAULT_DOMAIN: &str = "http://127.0.0.1:8080";

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Application context: every component constructed over one injected store.
///
/// Replaces the ambient persisted singletons of the platform store with an
/// explicit object the embedding passes by reference, so tests run against
/// in-memory doubles.
#[derive(Clone)]
pub struct AppContext {
    /// Shared durable store handle.
    pub store: Arc<dyn DurableStore>,
    /// User-identity facade.
    pub identity: IdentityManager,
    /// Collection-session facade.
    pub session: SessionState,
    /// Location relay.
    pub relay: LocationRelay,
    /// Bridge protocol handler.
    pub bridge: BridgeHandler,
}

impl AppContext {
    /// Assembles the context from an injected store and dispatch client.
    pub fn new(store: Arc<dyn DurableStore>, client: DispatchClient) -> Self {
        let identity = IdentityManager::new(store.clone());
        let session = SessionState::new(store.clone());
        let relay = LocationRelay::new(
            store.clone(),
            identity.clone(),
            session.clone(),
            client,
        );
        let bridge = BridgeHandler::new(store.clone(), session.clone());

        Self {
            store,
            identity,
            session,
            relay,
            bridge,
        }
    }
}

/// Selects the startup screen from the persisted identity.
///
/// # Errors
/// Returns [`AppError::Identity`] when the identity load fails.
pub fn startup_shell(identity: &IdentityManager) -> Result<ShellState, AppError> {
    Ok(ShellState::new(identity.load()?))
}

/// Binds a candidate user id and transitions the shell exactly once.
///
/// # Errors
/// Returns [`AppError::Identity`] for blank input or persistence failure;
/// the embedding reports the failure through a blocking alert and the shell
/// stays on the capture screen.
pub fn bind_identity(
    identity: &IdentityManager,
    shell: &mut ShellState,
    candidate: &str,
) -> Result<(), AppError> {
    let user_id = identity.bind(candidate)?;
    shell.on_bound(user_id);
    Ok(())
}

/// Builds the collection endpoint URL for a deployment domain.
pub fn collect_endpoint(domain: &str) -> String {
    format!("{}{}", domain.trim_end_matches('/'), COLLECT_ENDPOINT_PATH)
}

/// Reads the hosted-content domain from `GEO_COURIER_DOMAIN`.
pub fn domain_from_env() -> String {
    match std::env::var("GEO_COURIER_DOMAIN") {
        Ok(value) if !value.trim().is_empty() => value.trim().to_string(),
        _ => DEFAULT_DOMAIN.to_string(),
    }
}

/// Reads the update-deferral interval from `GEO_COURIER_DEFERRAL_INTERVAL_MS`.
pub fn deferral_interval_from_env() -> u64 {
    std::env::var("GEO_COURIER_DEFERRAL_INTERVAL_MS")
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .filter(|interval| *interval > 0)
        .unwrap_or(DEFAULT_DEFERRAL_INTERVAL_MS)
}

/// Reads the durable-store path from `GEO_COURIER_STORE_PATH`.
pub fn store_path_from_env() -> PathBuf {
    match std::env::var("GEO_COURIER_STORE_PATH") {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value.trim()),
        _ => PathBuf::from("geo-courier-store.json"),
    }
}

/// Reads the startup permission snapshot from env overrides.
///
/// Semantics per flag (`GEO_COURIER_FOREGROUND_GRANTED`,
/// `GEO_COURIER_BACKGROUND_GRANTED`):
/// - Unset => granted.
/// - `0`, `false`, `off` (case-insensitive) => denied.
/// - Any other value => granted.
pub fn permission_grant_from_env() -> PermissionGrant {
    PermissionGrant {
        foreground: env_flag_enabled("GEO_COURIER_FOREGROUND_GRANTED"),
        background: env_flag_enabled("GEO_COURIER_BACKGROUND_GRANTED"),
    }
}

/// Reads the bounded headless drive tick count from
/// `GEO_COURIER_SYNTHETIC_TICKS`, if set.
pub fn synthetic_ticks_from_env() -> Option<u64> {
    std::env::var("GEO_COURIER_SYNTHETIC_TICKS")
        .ok()
        .and_then(|value| value.trim().parse().ok())
}

fn env_flag_enabled(name: &str) -> bool {
    match std::env::var(name) {
        Ok(value) => {
            let normalized = value.trim().to_ascii_lowercase();
            !(normalized == "0" || normalized == "false" || normalized == "off")
        }
        Err(_) => true,
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Identity or session subsystem error.
    #[error("identity error: {0}")]
    Identity(#[from] IdentityError),
    /// Dispatch subsystem error.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
    /// Sampler subsystem error.
    #[error("sampler error: {0}")]
    Sampler(#[from] SamplerError),
    /// Shell subsystem error.
    #[error("shell error: {0}")]
    Shell(#[from] ShellError),
    /// Durable store error.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint composition.

    use super::*;

    #[test]
    fn collect_endpoint_normalizes_trailing_slash() {
        assert_eq!(
            collect_endpoint("http://collect.example.test:8080/"),
            "http://collect.example.test:8080/api/v1/user-collecting"
        );
    }
}
