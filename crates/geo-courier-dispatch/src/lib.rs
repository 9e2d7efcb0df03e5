#![warn(missing_docs)]
//! # geo-courier-dispatch
//!
//! ## Purpose
//! Implements the location relay: unconditional caching of the latest sample
//! and gated, best-effort delivery to the remote collection endpoint.
//!
//! ## Responsibilities
//! - Normalize raw readings and overwrite the last-known-location slot.
//! - Gate transmission on bound identity and an active collection session.
//! - Execute fire-and-forget submissions through an injectable transport.
//!
//! ## Data flow
//! Sampler trigger -> [`LocationRelay::relay`] -> cache write -> identity and
//! session gates -> [`DispatchClient`] -> [`CollectTransport`].
//!
//! ## Ownership and lifetimes
//! The relay holds shared handles to the store and facades; envelopes own
//! their payloads so transports never borrow relay state.
//!
//! ## Error model
//! Only cache-write failures surface as [`DispatchError`] to the caller.
//! Gating reads that fail are treated as "gate closed" and logged; transport
//! failures are logged and swallowed, preserving the fire-and-forget
//! contract. Every sample is an independent attempt with no retry.
//!
//! ## Security and privacy notes
//! Requests carry no credentials; the platform browser session shares cookies
//! ambiently. Coordinates and user ids are not logged.

use std::sync::Arc;

use geo_courier_core::{
    CollectEvent, CoreError, KEY_LOCATION, LocationSample, PositionReading, Provenance, UserId,
};
use geo_courier_identity::{IdentityManager, SessionState};
use geo_courier_store::{DurableStore, StoreError};
use thiserror::Error;
use url::Url;

/// Required collection endpoint path suffix.
pub const COLLECT_ENDPOINT_PATH: &str = "/api/v1/user-collecting";

/// One outbound submission: endpoint plus wire payload.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectEnvelope {
    /// Absolute endpoint URL.
    pub endpoint: String,
    /// Wire payload.
    pub event: CollectEvent,
}

/// Abstract transport used for collect-event submission.
pub trait CollectTransport: Send + Sync {
    /// Submits one envelope to the collection endpoint.
    ///
    /// # Errors
    /// Returns [`DispatchError`] on connection failure or non-success status.
    fn send(&self, envelope: &CollectEnvelope) -> Result<(), DispatchError>;
}

/// HTTP transport posting JSON bodies with a blocking client.
#[derive(Debug, Default)]
pub struct HttpCollectTransport {
    client: reqwest::blocking::Client,
}

impl HttpCollectTransport {
    /// Creates a transport with default client settings.
    ///
    /// No request timeout is configured; a slow endpoint delays only the
    /// relay worker that launched the send.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CollectTransport for HttpCollectTransport {
    fn send(&self, envelope: &CollectEnvelope) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&envelope.endpoint)
            .json(&envelope.event)
            .send()
            .map_err(|error| DispatchError::Transport(error.to_string()))?;

        let status = response.status();
        if status.is_client_error() {
            return Err(DispatchError::Client(status.as_u16()));
        }
        if status.is_server_error() {
            return Err(DispatchError::Server(status.as_u16()));
        }

        // Response bodies are never consumed; the contract is one-way.
        Ok(())
    }
}

/// Validates collection endpoint constraints.
///
/// The endpoint must parse as an absolute http/https URL whose path ends with
/// [`COLLECT_ENDPOINT_PATH`]. Plain http stays allowed for development
/// deployments of the collection backend.
///
/// # Errors
/// Returns [`DispatchError::InvalidEndpoint`] on violation.
pub fn validate_collect_endpoint(endpoint: &str) -> Result<(), DispatchError> {
    let parsed = Url::parse(endpoint)
        .map_err(|error| DispatchError::InvalidEndpoint(format!("invalid collect url: {error}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(DispatchError::InvalidEndpoint(
            "collect endpoint must use http or https".to_string(),
        ));
    }

    if !parsed.path().ends_with(COLLECT_ENDPOINT_PATH) {
        return Err(DispatchError::InvalidEndpoint(format!(
            "collect endpoint path must end with {COLLECT_ENDPOINT_PATH}"
        )));
    }

    Ok(())
}

/// Client that validates endpoint policy and executes submissions.
#[derive(Clone)]
pub struct DispatchClient {
    endpoint: String,
    transport: Arc<dyn CollectTransport>,
}

impl DispatchClient {
    /// Creates a validated dispatch client.
    ///
    /// # Errors
    /// Returns [`DispatchError::InvalidEndpoint`] when the endpoint violates
    /// the collection URL policy.
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn CollectTransport>,
    ) -> Result<Self, DispatchError> {
        let endpoint = endpoint.into();
        validate_collect_endpoint(&endpoint)?;
        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Submits one event through the configured transport.
    ///
    /// # Errors
    /// Propagates transport errors for the caller's logging decision.
    pub fn submit(&self, event: CollectEvent) -> Result<(), DispatchError> {
        self.transport.send(&CollectEnvelope {
            endpoint: self.endpoint.clone(),
            event,
        })
    }

    /// Returns the configured collection endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Result of one relay invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Sample was cached; an identity or session gate stopped transmission.
    CachedOnly,
    /// Sample was cached and a submission was launched.
    ///
    /// Launched, not delivered: transport failures are swallowed and never
    /// reported to relay callers.
    Transmitted,
}

/// Relays raw readings: cache unconditionally, transmit when gates pass.
#[derive(Clone)]
pub struct LocationRelay {
    store: Arc<dyn DurableStore>,
    identity: IdentityManager,
    session: SessionState,
    client: DispatchClient,
}

impl LocationRelay {
    /// Creates a relay over the injected store, facades, and client.
    pub fn new(
        store: Arc<dyn DurableStore>,
        identity: IdentityManager,
        session: SessionState,
        client: DispatchClient,
    ) -> Self {
        Self {
            store,
            identity,
            session,
            client,
        }
    }

    /// Processes one raw reading from either trigger.
    ///
    /// The sample is normalized and cached regardless of identity and session
    /// state, so the bridge can always answer coordinate queries with the
    /// freshest position. Transmission happens only when a user id is bound
    /// and a collection session is active.
    ///
    /// # Errors
    /// Returns [`DispatchError`] only when the cache write fails; every other
    /// failure mode is logged and absorbed here.
    pub fn relay(
        &self,
        reading: PositionReading,
        provenance: Provenance,
    ) -> Result<RelayOutcome, DispatchError> {
        let sample = LocationSample::from_reading(reading, provenance);
        self.store.put(KEY_LOCATION, &sample.to_json()?)?;

        let user_id = match self.read_user_id() {
            Some(user_id) => user_id,
            None => {
                tracing::info!(?provenance, "relay skipped: no user id bound");
                return Ok(RelayOutcome::CachedOnly);
            }
        };

        let collect_id = match self.read_collect_id() {
            Some(collect_id) => collect_id,
            None => {
                tracing::info!(?provenance, "relay skipped: no active collection session");
                return Ok(RelayOutcome::CachedOnly);
            }
        };

        let event = CollectEvent::new(&user_id, collect_id, sample.coordinates);
        if let Err(error) = self.client.submit(event) {
            tracing::warn!(error = %error, ?provenance, "collect submission failed; sample dropped");
        }

        Ok(RelayOutcome::Transmitted)
    }

    fn read_user_id(&self) -> Option<UserId> {
        match self.identity.load() {
            Ok(user_id) => user_id,
            Err(error) => {
                tracing::warn!(error = %error, "identity read failed; treating as unbound");
                None
            }
        }
    }

    fn read_collect_id(&self) -> Option<i64> {
        match self.session.active_collect() {
            Ok(collect_id) => collect_id,
            Err(error) => {
                tracing::warn!(error = %error, "session read failed; treating as inactive");
                None
            }
        }
    }
}

/// Dispatch layer error type.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Endpoint violates the collection URL policy.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
    /// Connection-level transport failure.
    #[error("collect transport failure: {0}")]
    Transport(String),
    /// Endpoint rejected the request (4xx).
    #[error("collect endpoint rejected request: status {0}")]
    Client(u16),
    /// Endpoint failed to process the request (5xx).
    #[error("collect endpoint failure: status {0}")]
    Server(u16),
    /// Sample could not be encoded for caching.
    #[error("sample codec failure: {0}")]
    Payload(#[from] CoreError),
    /// Last-known-location cache write failed.
    #[error("sample cache failure: {0}")]
    Cache(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    //! Unit tests for endpoint policy.

    use super::*;

    #[test]
    fn validates_expected_endpoint_policy() {
        validate_collect_endpoint("http://collect.example.test:8080/api/v1/user-collecting")
            .expect("endpoint should pass");
        validate_collect_endpoint("https://collect.example.test/api/v1/user-collecting")
            .expect("endpoint should pass");
        assert!(validate_collect_endpoint("ftp://collect.example.test/api/v1/user-collecting").is_err());
        assert!(validate_collect_endpoint("http://collect.example.test/api/v2/other").is_err());
        assert!(validate_collect_endpoint("not a url").is_err());
    }
}
