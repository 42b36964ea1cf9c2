//! Core telemetry event types describing diagnostics data exposed to
//! the CLI and session observer streams.

use serde::{Deserialize, Serialize};

use crate::analysis::classifier::GestureState;

/// High-level session lifecycle stages reported by engine instrumentation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    SessionStarted,
    WorkerSpawned,
    WorkerExited,
    SessionStopped,
}

/// Rich metric events covering decisions, shift magnitude, feed occupancy,
/// and sample rejections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    Decision {
        state: GestureState,
        smoothed_hz: f32,
        delta_hz: f32,
    },
    ShiftMagnitude {
        avg_hz: f32,
        max_hz: f32,
        sample_count: usize,
    },
    FeedOccupancy {
        channel: String,
        percent: f32,
    },
    InvalidSample {
        code: i32,
        context: String,
    },
    SessionLifecycle {
        phase: SessionPhase,
        timestamp_ms: u64,
    },
}
