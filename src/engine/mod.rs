//! Engine module housing the reusable session core.
//!
//! This module exposes the `SessionHandle` orchestration layer (`core`),
//! which ties the sample feed, the classification worker, and the observer
//! broadcast channels together for CLI and library entry points.

pub mod core;

pub use core::{SessionEvent, SessionEventKind, SessionHandle};
