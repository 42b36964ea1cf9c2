//! Deterministic harness utilities for driving the gesture pipeline.
//!
//! The simulator CLI and the integration tests both feed the classifier
//! from synthetic traces instead of a live sonar front end, so the
//! generators live in the library rather than under `tests/`.

pub mod signals;
