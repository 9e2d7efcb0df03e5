#![warn(missing_docs)]
//! # geo-courier-shell
//!
//! ## Purpose
//! Defines the host-view state model for `geo-courier`: which screen is
//! mounted, how the platform back gesture is resolved, and where the embedded
//! browser navigates.
//!
//! ## Responsibilities
//! - Select the identity-capture or browser screen from identity presence.
//! - Decide back-gesture handling from embedded-browser history state.
//! - Build the hosted-content URL carrying the bound user id.
//!
//! ## Data flow
//! Startup identity load seeds [`ShellState`]; a successful bind transitions
//! the screen exactly once. The embedding queries [`back_action`] on each
//! back gesture and [`hosted_url`] when mounting the browser screen.
//!
//! ## Ownership and lifetimes
//! `ShellState` owns its identity snapshot; the embedding holds the browser
//! instance and reports history availability.
//!
//! ## Error model
//! This crate favors explicit state over recoverable errors; only hosted-URL
//! construction can fail, with [`ShellError`].
//!
//! ## Security and privacy notes
//! The hosted URL carries the opaque user id as a query parameter; cookies
//! are shared between the browser and native requests by the platform.

use geo_courier_core::UserId;
use thiserror::Error;
use url::Url;

/// Mutually exclusive screens owned by the host view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Identity input screen, mounted while no user id is bound.
    IdentityCapture,
    /// Embedded browser screen, mounted once a user id is bound.
    Browser,
}

/// Resolution of one platform back gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackAction {
    /// Consume the gesture and navigate the embedded browser's history.
    NavigateBack,
    /// Do not intercept; defer to default platform behavior.
    Default,
}

/// Host-view runtime state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellState {
    user_id: Option<UserId>,
}

impl ShellState {
    /// Creates shell state from the startup identity load.
    pub fn new(user_id: Option<UserId>) -> Self {
        Self { user_id }
    }

    /// Returns the currently mounted screen.
    pub fn screen(&self) -> Screen {
        if self.user_id.is_some() {
            Screen::Browser
        } else {
            Screen::IdentityCapture
        }
    }

    /// Applies a successful identity bind.
    ///
    /// Transitions the view from capture to browser; the capture screen is
    /// unmounted afterwards, so re-binding is not reachable through the UI.
    pub fn on_bound(&mut self, user_id: UserId) {
        self.user_id = Some(user_id);
    }

    /// Returns the bound identity, if any.
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }
}

/// Resolves one platform back gesture.
///
/// The gesture is intercepted only while the embedded browser has a history
/// entry to navigate to; otherwise the platform default applies.
pub fn back_action(browser_history_available: bool) -> BackAction {
    if browser_history_available {
        BackAction::NavigateBack
    } else {
        BackAction::Default
    }
}

/// Builds the hosted-content URL: `{domain}?userId={userId}`.
///
/// # Errors
/// Returns [`ShellError::InvalidDomain`] when `domain` is not an absolute
/// URL.
pub fn hosted_url(domain: &str, user_id: &UserId) -> Result<String, ShellError> {
    let mut url = Url::parse(domain)
        .map_err(|error| ShellError::InvalidDomain(format!("invalid domain url: {error}")))?;

    url.query_pairs_mut().append_pair("userId", user_id.as_str());
    Ok(url.into())
}

/// Shell layer error type.
#[derive(Debug, Error)]
pub enum ShellError {
    /// Hosted domain is not a valid absolute URL.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
}
