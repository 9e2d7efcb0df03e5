//! Integration tests for permission-gated trigger activation.

use geo_courier_core::Provenance;
use geo_courier_sampler::{PermissionGrant, active_triggers};

#[test]
fn sampler_permission_tests_cover_every_grant_combination() {
    let denied = PermissionGrant {
        foreground: false,
        background: false,
    };
    assert!(active_triggers(denied).is_empty());

    let background_only = PermissionGrant {
        foreground: false,
        background: true,
    };
    assert!(active_triggers(background_only).is_empty());

    let foreground_only = PermissionGrant {
        foreground: true,
        background: false,
    };
    assert_eq!(active_triggers(foreground_only), vec![Provenance::Foreground]);

    let full = PermissionGrant {
        foreground: true,
        background: true,
    };
    assert_eq!(
        active_triggers(full),
        vec![Provenance::Foreground, Provenance::Background]
    );
}
