//! Integration tests for relay transmission gating.
//!
//! Transmission must occur exactly when a user id is bound AND a collection
//! session is active; all four truth-table combinations are covered.

mod common;

use geo_courier_core::Provenance;
use geo_courier_dispatch::RelayOutcome;

#[test]
fn relay_gating_tests_no_identity_no_session_caches_only() {
    let (context, transport) = common::fixture_context();

    let outcome = context
        .relay
        .relay(common::fixture_reading(), Provenance::Foreground)
        .expect("relay should succeed");

    assert_eq!(outcome, RelayOutcome::CachedOnly);
    assert!(transport.recorded().is_empty());
}

#[test]
fn relay_gating_tests_identity_without_session_caches_only() {
    let (context, transport) = common::fixture_context();
    context.identity.bind("u1").expect("bind should persist");

    let outcome = context
        .relay
        .relay(common::fixture_reading(), Provenance::Foreground)
        .expect("relay should succeed");

    assert_eq!(outcome, RelayOutcome::CachedOnly);
    assert!(transport.recorded().is_empty());
}

#[test]
fn relay_gating_tests_session_without_identity_caches_only() {
    let (context, transport) = common::fixture_context();
    context.session.start_collect(42).expect("session should persist");

    let outcome = context
        .relay
        .relay(common::fixture_reading(), Provenance::Background)
        .expect("relay should succeed");

    assert_eq!(outcome, RelayOutcome::CachedOnly);
    assert!(transport.recorded().is_empty());
}

#[test]
fn relay_gating_tests_identity_and_session_transmit() {
    let (context, transport) = common::fixture_context();
    context.identity.bind("u1").expect("bind should persist");
    context.session.start_collect(42).expect("session should persist");

    let outcome = context
        .relay
        .relay(common::fixture_reading(), Provenance::Foreground)
        .expect("relay should succeed");

    assert_eq!(outcome, RelayOutcome::Transmitted);
    let recorded = transport.recorded();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].event.user_id, "u1");
    assert_eq!(recorded[0].event.collect_id, 42);
}

#[test]
fn relay_gating_tests_stopped_session_suppresses_next_sample() {
    let (context, transport) = common::fixture_context();
    context.identity.bind("u1").expect("bind should persist");
    context.session.start_collect(42).expect("session should persist");

    context
        .relay
        .relay(common::fixture_reading(), Provenance::Foreground)
        .expect("relay should succeed");
    assert_eq!(transport.recorded().len(), 1);

    context.session.stop_collect().expect("session should clear");

    let outcome = context
        .relay
        .relay(common::fixture_reading(), Provenance::Foreground)
        .expect("relay should succeed");
    assert_eq!(outcome, RelayOutcome::CachedOnly);
    assert_eq!(transport.recorded().len(), 1);
}
