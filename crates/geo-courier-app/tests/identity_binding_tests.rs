//! Integration tests for identity binding and screen transition.

mod common;

use geo_courier_app::{bind_identity, startup_shell};
use geo_courier_shell::Screen;

#[test]
fn identity_binding_tests_transitions_screen_exactly_once() {
    let (context, _transport) = common::fixture_context();

    let mut shell = startup_shell(&context.identity).expect("startup should work");
    assert_eq!(shell.screen(), Screen::IdentityCapture);

    bind_identity(&context.identity, &mut shell, "rider-7").expect("bind should succeed");
    assert_eq!(shell.screen(), Screen::Browser);

    // Restarts resume the browser screen straight from the persisted id.
    let resumed = startup_shell(&context.identity).expect("startup should work");
    assert_eq!(resumed.screen(), Screen::Browser);
}

#[test]
fn identity_binding_tests_blank_candidate_keeps_capture_screen() {
    let (context, _transport) = common::fixture_context();

    let mut shell = startup_shell(&context.identity).expect("startup should work");
    assert!(bind_identity(&context.identity, &mut shell, "  ").is_err());
    assert_eq!(shell.screen(), Screen::IdentityCapture);
}
