//! Doppler gesture recognition core.
//!
//! Turns a stream of sonar frequency peaks into coarse hand-motion
//! decisions (approaching, receding, stationary). Peaks enter through a
//! lock-free SPSC feed, a dedicated worker thread smooths and classifies
//! them, and decisions fan out over broadcast channels and async streams.

// Module declarations
pub mod analysis;
pub mod config;
pub mod engine;
pub mod error;
pub mod feed;
pub mod managers;
pub mod telemetry;
pub mod testing;

// Re-exports for convenience
pub use analysis::{GestureClassifier, GestureDecision, GestureState, TickMetrics, TickOutcome};
pub use config::AppConfig;
pub use engine::SessionHandle;
pub use feed::{PeakSample, SampleFeed};

/// Install the process-wide tracing subscriber.
///
/// Respects `RUST_LOG` when set and defaults to `info` otherwise. Events go
/// to stderr so CLI consumers keep a clean stdout. Safe to call more than
/// once; repeated calls keep the first subscriber.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        init_logging();
        init_logging();
    }

    #[test]
    fn test_default_config_wires_consistent_thresholds() {
        let config = AppConfig::default();

        assert!(config.classifier.hysteresis_threshold_hz < config.classifier.motion_threshold_hz);
        assert!(config.carrier.contains(config.carrier.default_hz));
    }
}
