//! Shared fixtures for app integration tests.

use std::sync::{Arc, Mutex};

use geo_courier_app::AppContext;
use geo_courier_core::{Coordinates, PositionReading};
use geo_courier_dispatch::{CollectEnvelope, CollectTransport, DispatchClient, DispatchError};
use geo_courier_store::MemoryStore;

/// Endpoint accepted by the collect URL policy, used across tests.
#[allow(dead_code)]
pub const TEST_ENDPOINT: &str = "http://collect.example.test:8080/api/v1/user-collecting";

/// Transport that records every envelope instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    envelopes: Mutex<Vec<CollectEnvelope>>,
}

impl RecordingTransport {
    /// Returns a snapshot of recorded envelopes.
    #[allow(dead_code)]
    pub fn recorded(&self) -> Vec<CollectEnvelope> {
        self.envelopes.lock().expect("envelope lock should work").clone()
    }
}

impl CollectTransport for RecordingTransport {
    fn send(&self, envelope: &CollectEnvelope) -> Result<(), DispatchError> {
        self.envelopes
            .lock()
            .expect("envelope lock should work")
            .push(envelope.clone());
        Ok(())
    }
}

/// Transport that counts attempts and fails every one of them.
#[derive(Debug, Default)]
pub struct FailingTransport {
    attempts: Mutex<u32>,
}

impl FailingTransport {
    /// Returns how many sends were attempted.
    #[allow(dead_code)]
    pub fn attempts(&self) -> u32 {
        *self.attempts.lock().expect("attempt lock should work")
    }
}

impl CollectTransport for FailingTransport {
    fn send(&self, _envelope: &CollectEnvelope) -> Result<(), DispatchError> {
        let mut attempts = self.attempts.lock().expect("attempt lock should work");
        *attempts += 1;
        Err(DispatchError::Server(503))
    }
}

/// Builds an app context over a fresh in-memory store and recording transport.
#[allow(dead_code)]
pub fn fixture_context() -> (AppContext, Arc<RecordingTransport>) {
    let transport = Arc::new(RecordingTransport::default());
    let client = DispatchClient::new(TEST_ENDPOINT, transport.clone())
        .expect("dispatch client should build");
    (AppContext::new(Arc::new(MemoryStore::new()), client), transport)
}

/// Deterministic reading fixture matching the documented scenarios.
#[allow(dead_code)]
pub fn fixture_reading() -> PositionReading {
    PositionReading::new(
        Coordinates::new(37.5, 127.0).expect("coordinates should be valid"),
        1_000,
    )
}
