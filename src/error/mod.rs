// Error types for the Doppler gesture engine
//
// This module defines custom error types for sample validation and session
// lifecycle operations, providing structured error handling with numeric
// error codes suitable for diagnostics surfaces.

mod sample;
mod session;

pub use sample::{log_sample_error, SampleError, SampleErrorCodes};
pub use session::{log_session_error, SessionError, SessionErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// logging and telemetry surfaces.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
