// Sample validation error types and constants

use crate::error::ErrorCode;
use log::warn;
use std::fmt;

/// Sample rejection code constants
///
/// These constants provide a single source of truth for the codes attached
/// to rejected peak samples, shared between logging and telemetry events.
///
/// Error code range: 2001-2003
pub struct SampleErrorCodes {}

impl SampleErrorCodes {
    /// Peak frequency is NaN or infinite
    pub const NON_FINITE: i32 = 2001;

    /// Peak frequency is negative
    pub const NEGATIVE: i32 = 2002;

    /// Sample timestamp moved backwards relative to the previous sample
    pub const NON_MONOTONIC: i32 = 2003;
}

/// Log a rejected sample with structured context
///
/// Rejections are expected during normal operation (a glitchy front end
/// produces them), so they log at warn level rather than error.
pub fn log_sample_error(err: &SampleError, context: &str) {
    warn!(
        "Sample rejected in {}: code={}, component=GestureClassifier, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Per-sample validation errors
///
/// A rejected sample is dropped before it can touch the smoothing buffer or
/// classifier state; the classification algorithm itself stays total.
///
/// Error code range: 2001-2003
#[derive(Debug, Clone, PartialEq)]
pub enum SampleError {
    /// Peak frequency is NaN or infinite
    NonFinite { value: f32 },

    /// Peak frequency is negative
    Negative { value: f32 },

    /// Sample timestamp moved backwards relative to the previous sample
    NonMonotonic { regression_ms: u64 },
}

impl ErrorCode for SampleError {
    fn code(&self) -> i32 {
        match self {
            SampleError::NonFinite { .. } => SampleErrorCodes::NON_FINITE,
            SampleError::Negative { .. } => SampleErrorCodes::NEGATIVE,
            SampleError::NonMonotonic { .. } => SampleErrorCodes::NON_MONOTONIC,
        }
    }

    fn message(&self) -> String {
        match self {
            SampleError::NonFinite { value } => {
                format!("Peak frequency must be finite (got {})", value)
            }
            SampleError::Negative { value } => {
                format!("Peak frequency must be non-negative (got {})", value)
            }
            SampleError::NonMonotonic { regression_ms } => {
                format!(
                    "Sample timestamp moved {} ms behind the previous sample",
                    regression_ms
                )
            }
        }
    }
}

impl fmt::Display for SampleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SampleError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SampleError {}
