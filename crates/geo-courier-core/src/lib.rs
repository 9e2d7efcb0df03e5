#![warn(missing_docs)]
//! # geo-courier-core
//!
//! ## Purpose
//! Defines the pure data model used across the `geo-courier` workspace.
//!
//! ## Responsibilities
//! - Represent raw position readings and normalized location samples.
//! - Build the outbound collect-event wire payload.
//! - Fix the durable-store key contract shared with the platform store.
//!
//! ## Data flow
//! Sampler triggers emit [`PositionReading`] values. The relay normalizes each
//! reading into a [`LocationSample`], caches it under [`KEY_LOCATION`], and,
//! when identity and session gates pass, packages a [`CollectEvent`] for the
//! collection endpoint.
//!
//! ## Ownership and lifetimes
//! Samples and events own their string/number fields to avoid hidden
//! borrow/lifetime coupling between runtime stages.
//!
//! ## Error model
//! Validation failures (out-of-range coordinates, blank user id) and codec
//! failures return [`CoreError`] variants with caller-actionable
//! categorization.
//!
//! ## Security and privacy notes
//! This crate treats user identifiers as opaque values and never transforms
//! or logs them.
//!
//! ## Example
//! ```rust
//! use geo_courier_core::{Coordinates, LocationSample, Provenance};
//!
//! let coordinates = Coordinates::new(37.5, 127.0).expect("valid coordinates");
//! let sample = LocationSample::new(coordinates, 1_000, Provenance::Foreground);
//! let encoded = sample.to_json().expect("sample should encode");
//! assert_eq!(LocationSample::from_json(&encoded).unwrap(), sample);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Durable-store key holding the bound user identifier.
pub const KEY_USER_ID: &str = "userId";

/// Durable-store key holding the JSON-serialized last known sample.
pub const KEY_LOCATION: &str = "location";

/// Durable-store key holding the string-encoded active collect id.
///
/// An empty string means no collection session is active.
pub const KEY_COLLECT_ID: &str = "collectId";

/// Geographic coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lng: f64,
}

impl Coordinates {
    /// Constructs validated coordinates.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidCoordinates`] when latitude is outside
    /// `[-90, 90]`, longitude is outside `[-180, 180]`, or either value is
    /// not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        if !lat.is_finite() || !lng.is_finite() || !(-90.0..=90.0).contains(&lat)
            || !(-180.0..=180.0).contains(&lng)
        {
            return Err(CoreError::InvalidCoordinates { lat, lng });
        }

        Ok(Self { lat, lng })
    }
}

/// Which trigger produced a position reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Provenance {
    /// Continuous watch active while the host process is foregrounded.
    Foreground,
    /// OS-scheduled background task invocation.
    Background,
}

/// Raw position reading delivered by a position source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionReading {
    /// Reported coordinates.
    pub coordinates: Coordinates,
    /// Capture time in Unix epoch milliseconds.
    pub captured_at_ms: u64,
}

impl PositionReading {
    /// Constructs a reading from already-validated coordinates.
    pub fn new(coordinates: Coordinates, captured_at_ms: u64) -> Self {
        Self {
            coordinates,
            captured_at_ms,
        }
    }
}

/// Normalized location sample cached as the single last-known-location slot.
///
/// Foreground and background readings are structurally identical once
/// normalized; provenance is retained for observability only.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    /// Normalized coordinates.
    pub coordinates: Coordinates,
    /// Capture time in Unix epoch milliseconds.
    pub captured_at_ms: u64,
    /// Trigger that produced the sample.
    pub provenance: Provenance,
}

impl LocationSample {
    /// Normalizes a raw reading into a sample.
    pub fn new(coordinates: Coordinates, captured_at_ms: u64, provenance: Provenance) -> Self {
        Self {
            coordinates,
            captured_at_ms,
            provenance,
        }
    }

    /// Normalizes a [`PositionReading`] with its trigger provenance.
    pub fn from_reading(reading: PositionReading, provenance: Provenance) -> Self {
        Self::new(reading.coordinates, reading.captured_at_ms, provenance)
    }

    /// Serializes the sample to compact JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(CoreError::Codec)
    }

    /// Deserializes a sample from JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(CoreError::Codec)
    }
}

/// Opaque user identifier bound through the identity-capture screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Constructs a validated user id.
    ///
    /// # Errors
    /// Returns [`CoreError::EmptyUserId`] when the candidate is blank.
    pub fn new(candidate: impl Into<String>) -> Result<Self, CoreError> {
        let candidate = candidate.into();
        if candidate.trim().is_empty() {
            return Err(CoreError::EmptyUserId);
        }

        Ok(Self(candidate))
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the id and returns the owned string.
    pub fn into_string(self) -> String {
        self.0
    }
}

/// Outbound wire payload submitted to the collection endpoint.
///
/// Constructed only when both a bound user id and an active collect id exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectEvent {
    /// Bound user identifier.
    pub user_id: String,
    /// Active collection session identifier.
    pub collect_id: i64,
    /// Sampled coordinates.
    pub location: Coordinates,
}

impl CollectEvent {
    /// Builds the wire payload for one sample.
    pub fn new(user_id: &UserId, collect_id: i64, location: Coordinates) -> Self {
        Self {
            user_id: user_id.as_str().to_string(),
            collect_id,
            location,
        }
    }

    /// Serializes the event to compact JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON serialization fails.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string(self).map_err(CoreError::Codec)
    }

    /// Deserializes an event from JSON.
    ///
    /// # Errors
    /// Returns [`CoreError::Codec`] when JSON decoding fails.
    pub fn from_json(raw: &str) -> Result<Self, CoreError> {
        serde_json::from_str(raw).map_err(CoreError::Codec)
    }
}

/// Error type for core domain validation and codec failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Coordinates fall outside valid geographic ranges.
    #[error("invalid coordinates: lat={lat} lng={lng}")]
    InvalidCoordinates {
        /// Rejected latitude.
        lat: f64,
        /// Rejected longitude.
        lng: f64,
    },
    /// User id cannot be blank.
    #[error("user id must be non-empty")]
    EmptyUserId,
    /// JSON encoding/decoding error.
    #[error("payload codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}
