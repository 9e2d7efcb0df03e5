//! Benchmark crate; all logic lives in `tests/`.
