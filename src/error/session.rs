// Session lifecycle error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Session error code constants
///
/// These constants provide a single source of truth for error codes
/// surfaced by session lifecycle and carrier management operations.
///
/// Error code range: 1001-1005
pub struct SessionErrorCodes {}

impl SessionErrorCodes {
    /// Session is already running
    pub const ALREADY_RUNNING: i32 = 1001;

    /// Session is not running
    pub const NOT_RUNNING: i32 = 1002;

    /// Requested carrier frequency is outside the supported band
    pub const CARRIER_OUT_OF_RANGE: i32 = 1003;

    /// Sample feed disconnected or channel closed unexpectedly
    pub const FEED_DISCONNECTED: i32 = 1004;

    /// Mutex/RwLock was poisoned
    pub const LOCK_POISONED: i32 = 1005;
}

/// Log a session error with structured context
pub fn log_session_error(err: &SessionError, context: &str) {
    error!(
        "Session error in {}: code={}, component=SessionHandle, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Session-related errors
///
/// These errors cover session lifecycle (start/stop), carrier retuning, and
/// feed wiring.
///
/// Error code range: 1001-1005
#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// Session is already running
    AlreadyRunning,

    /// Session is not running
    NotRunning,

    /// Requested carrier frequency is outside the supported band
    CarrierOutOfRange { hz: f32, min_hz: f32, max_hz: f32 },

    /// Sample feed disconnected or channel closed unexpectedly
    FeedDisconnected { reason: String },

    /// Mutex/RwLock was poisoned
    LockPoisoned { component: String },
}

impl ErrorCode for SessionError {
    fn code(&self) -> i32 {
        match self {
            SessionError::AlreadyRunning => SessionErrorCodes::ALREADY_RUNNING,
            SessionError::NotRunning => SessionErrorCodes::NOT_RUNNING,
            SessionError::CarrierOutOfRange { .. } => SessionErrorCodes::CARRIER_OUT_OF_RANGE,
            SessionError::FeedDisconnected { .. } => SessionErrorCodes::FEED_DISCONNECTED,
            SessionError::LockPoisoned { .. } => SessionErrorCodes::LOCK_POISONED,
        }
    }

    fn message(&self) -> String {
        match self {
            SessionError::AlreadyRunning => {
                "Session already running. Call stop() first.".to_string()
            }
            SessionError::NotRunning => "Session not running. Call start() first.".to_string(),
            SessionError::CarrierOutOfRange { hz, min_hz, max_hz } => {
                format!(
                    "Carrier frequency {} Hz outside supported band {}-{} Hz",
                    hz, min_hz, max_hz
                )
            }
            SessionError::FeedDisconnected { reason } => {
                format!("Sample feed disconnected: {}", reason)
            }
            SessionError::LockPoisoned { component } => {
                format!("Lock poisoned on {}", component)
            }
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SessionError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SessionError {}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::FeedDisconnected {
            reason: err.to_string(),
        }
    }
}
