//! Contract-test crate; all logic lives in `tests/`.
