//! Validates contract fixtures against frozen JSON schemas.

use jsonschema::JSONSchema;
use serde_json::Value;

fn load_json(path: &str) -> Value {
    let raw = std::fs::read_to_string(path).expect("json file should be readable");
    serde_json::from_str(&raw).expect("json file should be valid")
}

fn compile_validator(schema_path: &str) -> JSONSchema {
    let schema = load_json(schema_path);
    JSONSchema::compile(&schema).expect("schema should compile")
}

#[test]
fn collect_event_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/collect-event.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/collect-event.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "collect-event fixture should validate against schema"
    );
}

#[test]
fn bridge_start_collect_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/bridge-inbound.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/bridge-start-collect.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "startCollect fixture should validate against schema"
    );
}

#[test]
fn coordinate_response_fixture_matches_schema() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/bridge-coordinate-response.schema.json"
    ));
    let fixture = load_json(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/fixtures/bridge-coordinate-response.valid.json"
    ));
    assert!(
        validator.is_valid(&fixture),
        "coordinate response fixture should validate against schema"
    );
}

#[test]
fn collect_event_schema_rejects_string_collect_id() {
    let validator = compile_validator(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../contracts/collect-event.schema.json"
    ));
    let invalid: Value = serde_json::json!({
        "userId": "u1",
        "collectId": "42",
        "location": { "lat": 37.5, "lng": 127.0 }
    });
    assert!(
        !validator.is_valid(&invalid),
        "string-encoded collect id must not validate"
    );
}
