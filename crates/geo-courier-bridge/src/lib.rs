#![warn(missing_docs)]
//! # geo-courier-bridge
//!
//! ## Purpose
//! Defines the wire contract between hosted web content and the native layer,
//! and dispatches web-originated messages.
//!
//! ## Responsibilities
//! - Parse JSON-encoded bridge messages into a closed tagged union.
//! - Answer coordinate queries from the cached last known sample.
//! - Toggle the collection session on start/stop messages.
//! - Preserve unknown message tags for logging instead of failing.
//!
//! ## Data flow
//! Raw channel string -> [`parse_bridge_message`] -> [`BridgeHandler::handle`]
//! -> optional response string posted back over the same channel.
//!
//! ## Ownership and lifetimes
//! Parsed messages and responses are owned values to avoid borrowing from
//! transient channel buffers.
//!
//! ## Error model
//! Malformed payloads return [`BridgeError`] from the parser; the handler
//! converts every failure into a logged drop. Nothing propagates to the
//! channel as a fatal error, and no failure produces a response.
//!
//! ## Security and privacy notes
//! Message bodies may contain coordinates; they are never logged verbatim.
//!
//! ## Example
//! ```rust
//! use geo_courier_bridge::{BridgeMessage, parse_bridge_message};
//!
//! let message = parse_bridge_message(r#"{"type":"startCollect","payload":{"id":42}}"#)
//!     .expect("message should parse");
//! assert_eq!(message, BridgeMessage::StartCollect { id: 42 });
//! ```

use std::sync::Arc;

use geo_courier_core::{KEY_LOCATION, LocationSample};
use geo_courier_identity::SessionState;
use geo_courier_store::DurableStore;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inbound message from hosted web content.
///
/// Closed tagged union: unrecognized tags map to [`BridgeMessage::Unknown`]
/// rather than a parse failure, so new web-side message types degrade to a
/// logged drop instead of an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeMessage {
    /// Synchronous-style query for the cached position.
    Coordinate,
    /// Activates a collection session with the given id.
    StartCollect {
        /// Session identifier chosen by the web layer.
        id: i64,
    },
    /// Deactivates the current collection session.
    StopCollect,
    /// Unrecognized message type, preserved for logging.
    Unknown {
        /// Original tag value.
        kind: String,
    },
}

#[derive(Deserialize)]
struct RawBridgeMessage {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Option<serde_json::Value>,
}

#[derive(Deserialize)]
struct StartCollectPayload {
    id: i64,
}

/// Coordinates reported back to the web layer.
///
/// Both fields serialize as `null` when no sample has ever been cached; an
/// empty cache is a valid answer, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportedLocation {
    /// Cached latitude, if any.
    pub lat: Option<f64>,
    /// Cached longitude, if any.
    pub lng: Option<f64>,
}

/// Payload of a coordinate response.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinatePayload {
    /// Last known location.
    pub location: ReportedLocation,
}

/// Outbound message to hosted web content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeResponse {
    /// Answer to a coordinate query.
    Coordinate {
        /// Response payload.
        payload: CoordinatePayload,
    },
}

/// Parses one raw channel string into a bridge message.
///
/// # Errors
/// Returns [`BridgeError::Decode`] for malformed JSON and
/// [`BridgeError::InvalidPayload`] when `startCollect` lacks a numeric `id`.
pub fn parse_bridge_message(raw: &str) -> Result<BridgeMessage, BridgeError> {
    let envelope: RawBridgeMessage = serde_json::from_str(raw).map_err(BridgeError::Decode)?;

    match envelope.kind.as_str() {
        "coordinate" => Ok(BridgeMessage::Coordinate),
        "startCollect" => {
            let payload = envelope.payload.ok_or_else(|| {
                BridgeError::InvalidPayload("startCollect requires a payload".to_string())
            })?;
            let payload: StartCollectPayload = serde_json::from_value(payload)
                .map_err(|error| BridgeError::InvalidPayload(error.to_string()))?;
            Ok(BridgeMessage::StartCollect { id: payload.id })
        }
        "stopCollect" => Ok(BridgeMessage::StopCollect),
        _ => Ok(BridgeMessage::Unknown {
            kind: envelope.kind,
        }),
    }
}

/// Dispatches web-originated messages against session state and the sample
/// cache.
#[derive(Clone)]
pub struct BridgeHandler {
    store: Arc<dyn DurableStore>,
    session: SessionState,
}

impl BridgeHandler {
    /// Creates a handler over the injected store and session facade.
    pub fn new(store: Arc<dyn DurableStore>, session: SessionState) -> Self {
        Self { store, session }
    }

    /// Handles one raw channel message.
    ///
    /// Returns the JSON response to post back, or `None` when the message
    /// produces no response (mutations, unknown tags, malformed input).
    /// Never panics and never surfaces an error to the channel.
    pub fn handle(&self, raw: &str) -> Option<String> {
        let message = match parse_bridge_message(raw) {
            Ok(message) => message,
            Err(error) => {
                tracing::warn!(error = %error, "bridge message dropped");
                return None;
            }
        };

        match message {
            BridgeMessage::Coordinate => self.coordinate_response(),
            BridgeMessage::StartCollect { id } => {
                if let Err(error) = self.session.start_collect(id) {
                    tracing::warn!(error = %error, "startCollect failed; session unchanged");
                }
                None
            }
            BridgeMessage::StopCollect => {
                if let Err(error) = self.session.stop_collect() {
                    tracing::warn!(error = %error, "stopCollect failed; session unchanged");
                }
                None
            }
            BridgeMessage::Unknown { kind } => {
                tracing::warn!(kind = %kind, "unknown bridge message dropped");
                None
            }
        }
    }

    /// Builds the coordinate answer from the cache.
    ///
    /// Exactly one response per query: a missing or unreadable cache answers
    /// with null coordinates.
    fn coordinate_response(&self) -> Option<String> {
        let cached = match self.store.get(KEY_LOCATION) {
            Ok(cached) => cached,
            Err(error) => {
                tracing::warn!(error = %error, "cache read failed; answering with null coordinates");
                None
            }
        };

        let location = cached
            .and_then(|raw| match LocationSample::from_json(&raw) {
                Ok(sample) => Some(sample),
                Err(error) => {
                    tracing::warn!(error = %error, "cached sample is corrupt; answering with null coordinates");
                    None
                }
            })
            .map(|sample| ReportedLocation {
                lat: Some(sample.coordinates.lat),
                lng: Some(sample.coordinates.lng),
            })
            .unwrap_or(ReportedLocation {
                lat: None,
                lng: None,
            });

        let response = BridgeResponse::Coordinate {
            payload: CoordinatePayload { location },
        };

        match serde_json::to_string(&response) {
            Ok(encoded) => Some(encoded),
            Err(error) => {
                tracing::error!(error = %error, "coordinate response encoding failed");
                None
            }
        }
    }
}

/// Bridge protocol errors.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// JSON decode failure.
    #[error("bridge decode failure: {0}")]
    Decode(#[from] serde_json::Error),
    /// Parsed message violates the protocol contract.
    #[error("bridge payload violation: {0}")]
    InvalidPayload(String),
}
