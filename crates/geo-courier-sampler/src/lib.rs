#![warn(missing_docs)]
//! # geo-courier-sampler
//!
//! ## Purpose
//! Provides position acquisition abstractions and trigger gating for the two
//! redundant sampling mechanisms: the foreground watch and the OS-scheduled
//! background task.
//!
//! ## Responsibilities
//! - Define a backend-agnostic position source trait.
//! - Expose deterministic synthetic positions for CI and unit tests.
//! - Gate trigger activation on the one-time startup permission grant.
//! - Provide update-deferral scheduling helpers used by the app runtime.
//!
//! ## Data flow
//! Trigger runners poll a [`PositionSource`] at the configured deferral
//! interval and publish each [`geo_courier_core::PositionReading`] to the
//! relay, tagged with trigger provenance.
//!
//! ## Ownership and lifetimes
//! Readings are owned values; no borrowed position memory escapes source
//! boundaries.
//!
//! ## Error model
//! Invalid configuration and source failures are reported as [`SamplerError`]
//! values. A failed source invocation aborts that tick only; every tick is an
//! independent attempt with no backoff.
//!
//! ## Security and privacy notes
//! Position sources must not persist readings; caching is the relay's job.

use std::sync::Mutex;

use geo_courier_core::{PositionReading, Provenance};
use thiserror::Error;

/// Task identifier registered with the OS background-location facility.
///
/// Registration under a fixed name lets OS-initiated relaunches resume the
/// background trigger after process restarts.
pub const BACKGROUND_TASK_NAME: &str = "background-location-task";

/// Default minimum interval between position updates, in milliseconds.
pub const DEFAULT_DEFERRAL_INTERVAL_MS: u64 = 10_000;

/// Positioning accuracy tier requested from the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccuracyTier {
    /// Cell/wifi-level accuracy.
    Coarse,
    /// Balanced power/accuracy trade-off.
    Balanced,
    /// GPS-level accuracy.
    High,
    /// Highest available tier, intended for turn-by-turn use.
    BestForNavigation,
}

/// Sampler configuration shared by both triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Requested accuracy tier.
    pub accuracy: AccuracyTier,
    /// Minimum interval between delivered updates, in milliseconds.
    pub deferral_interval_ms: u64,
}

impl SamplerConfig {
    /// Creates validated sampler configuration.
    ///
    /// # Errors
    /// Returns [`SamplerError::InvalidInterval`] when `deferral_interval_ms`
    /// is zero.
    pub fn new(accuracy: AccuracyTier, deferral_interval_ms: u64) -> Result<Self, SamplerError> {
        if deferral_interval_ms == 0 {
            return Err(SamplerError::InvalidInterval);
        }
        Ok(Self {
            accuracy,
            deferral_interval_ms,
        })
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            accuracy: AccuracyTier::BestForNavigation,
            deferral_interval_ms: DEFAULT_DEFERRAL_INTERVAL_MS,
        }
    }
}

/// Snapshot of the one-time startup permission request.
///
/// Permissions are requested once at startup; there is no re-prompt or
/// polling for changes during the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionGrant {
    /// Foreground location permission granted.
    pub foreground: bool,
    /// Background location permission granted.
    pub background: bool,
}

/// Returns the triggers allowed to activate under `grant`.
///
/// # Semantics
/// - Foreground denied: no triggers activate.
/// - Foreground only: the foreground watch activates alone; the background
///   task may still be registered but receives no OS-delivered updates.
/// - Both granted: both triggers activate.
pub fn active_triggers(grant: PermissionGrant) -> Vec<Provenance> {
    if !grant.foreground {
        return Vec::new();
    }

    let mut triggers = vec![Provenance::Foreground];
    if grant.background {
        triggers.push(Provenance::Background);
    }
    triggers
}

/// Trait implemented by concrete position providers.
pub trait PositionSource: Send + Sync {
    /// Acquires the device's current position.
    ///
    /// # Errors
    /// Returns [`SamplerError::Source`] when the platform cannot deliver a
    /// reading for this tick.
    fn current_position(&self) -> Result<PositionReading, SamplerError>;
}

/// Deterministic scripted source for test and CI usage.
///
/// Replays a fixed reading sequence; once exhausted it keeps returning the
/// final reading, mimicking a stationary device.
#[derive(Debug)]
pub struct SyntheticPositionSource {
    readings: Vec<PositionReading>,
    cursor: Mutex<usize>,
}

impl SyntheticPositionSource {
    /// Creates a source replaying `readings` in order.
    ///
    /// # Errors
    /// Returns [`SamplerError::EmptyScript`] when `readings` is empty.
    pub fn new(readings: Vec<PositionReading>) -> Result<Self, SamplerError> {
        if readings.is_empty() {
            return Err(SamplerError::EmptyScript);
        }
        Ok(Self {
            readings,
            cursor: Mutex::new(0),
        })
    }
}

impl PositionSource for SyntheticPositionSource {
    fn current_position(&self) -> Result<PositionReading, SamplerError> {
        let mut cursor = self
            .cursor
            .lock()
            .map_err(|_| SamplerError::Source("synthetic cursor lock poisoned".to_string()))?;

        let reading = self.readings[(*cursor).min(self.readings.len() - 1)];
        *cursor += 1;
        Ok(reading)
    }
}

/// Computes deterministic delivery timestamps for one trigger.
///
/// # Returns
/// Vector of `count` timestamps starting at `start_ms` spaced by the
/// configured deferral interval.
pub fn scheduled_sample_times(config: SamplerConfig, start_ms: u64, count: usize) -> Vec<u64> {
    (0..count)
        .map(|index| {
            start_ms.saturating_add(config.deferral_interval_ms.saturating_mul(index as u64))
        })
        .collect()
}

/// Sampler layer error type.
#[derive(Debug, Error)]
pub enum SamplerError {
    /// Deferral interval must be positive.
    #[error("invalid deferral interval: must be greater than zero")]
    InvalidInterval,
    /// Synthetic source needs at least one scripted reading.
    #[error("synthetic source requires at least one reading")]
    EmptyScript,
    /// Platform source failed to deliver a reading.
    #[error("position source failure: {0}")]
    Source(String),
}
