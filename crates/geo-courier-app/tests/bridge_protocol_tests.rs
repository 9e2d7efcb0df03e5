//! Integration tests for bridge message dispatch and responses.

mod common;

use geo_courier_core::Provenance;
use serde_json::Value;

#[test]
fn bridge_protocol_tests_coordinate_answers_null_before_any_sample() {
    let (context, _transport) = common::fixture_context();

    let response = context
        .bridge
        .handle(r#"{"type":"coordinate"}"#)
        .expect("coordinate query should always answer");

    let parsed: Value = serde_json::from_str(&response).expect("response should be JSON");
    assert_eq!(parsed["type"], "coordinate");
    assert!(parsed["payload"]["location"]["lat"].is_null());
    assert!(parsed["payload"]["location"]["lng"].is_null());
}

#[test]
fn bridge_protocol_tests_coordinate_answers_cached_sample() {
    let (context, _transport) = common::fixture_context();
    context
        .relay
        .relay(common::fixture_reading(), Provenance::Foreground)
        .expect("relay should succeed");

    let response = context
        .bridge
        .handle(r#"{"type":"coordinate"}"#)
        .expect("coordinate query should always answer");

    let parsed: Value = serde_json::from_str(&response).expect("response should be JSON");
    assert_eq!(parsed["payload"]["location"]["lat"], 37.5);
    assert_eq!(parsed["payload"]["location"]["lng"], 127.0);
}

#[test]
fn bridge_protocol_tests_start_collect_activates_session() {
    let (context, _transport) = common::fixture_context();

    let response = context
        .bridge
        .handle(r#"{"type":"startCollect","payload":{"id":42}}"#);
    assert!(response.is_none());

    assert_eq!(
        context.session.active_collect().expect("read should work"),
        Some(42)
    );
}

#[test]
fn bridge_protocol_tests_malformed_json_produces_no_response() {
    let (context, _transport) = common::fixture_context();

    assert!(context.bridge.handle("").is_none());
    assert!(context.bridge.handle("{not json").is_none());
    assert!(context.bridge.handle(r#"{"payload":{}}"#).is_none());
}

#[test]
fn bridge_protocol_tests_missing_start_payload_leaves_session_unchanged() {
    let (context, _transport) = common::fixture_context();

    assert!(context.bridge.handle(r#"{"type":"startCollect"}"#).is_none());
    assert!(
        context
            .session
            .active_collect()
            .expect("read should work")
            .is_none()
    );
}

#[test]
fn bridge_protocol_tests_unknown_tags_are_dropped_silently() {
    let (context, _transport) = common::fixture_context();

    assert!(
        context
            .bridge
            .handle(r#"{"type":"pushToken","payload":{"token":"t"}}"#)
            .is_none()
    );
}
