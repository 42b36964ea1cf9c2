//! Configuration management for dynamic parameter tuning
//!
//! This module provides runtime configuration loading from JSON files,
//! enabling fast iteration without recompilation. Classifier thresholds,
//! carrier band limits, and feed sizing can all be adjusted via the config
//! file for rapid experimentation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub classifier: ClassifierConfig,
    pub carrier: CarrierConfig,
    pub feed: FeedConfig,
}

/// Gesture classifier parameters
///
/// Defaults reproduce the reference deployment; every value is overridable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Exponential weight toward the newest raw sample (0..=1)
    pub smoothing_weight: f32,
    /// Bounded smoothing buffer capacity
    pub history_size: usize,
    /// Lower bound of the stationary band and the outlier-check radius, in Hz
    pub hysteresis_threshold_hz: f32,
    /// Lower bound of the approaching/receding bands, in Hz
    pub motion_threshold_hz: f32,
    /// Minimum time between emitted decisions, in milliseconds
    pub debounce_interval_ms: u64,
}

impl ClassifierConfig {
    /// Debounce interval as a `Duration` for timestamp arithmetic.
    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_interval_ms)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            smoothing_weight: 0.7,
            history_size: 5,
            hysteresis_threshold_hz: 3.0,
            motion_threshold_hz: 5.0,
            debounce_interval_ms: 500,
        }
    }
}

/// Carrier tone band configuration
///
/// The session validates retune requests against this band; the classifier
/// itself never reads the carrier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierConfig {
    /// Minimum supported carrier frequency in Hz
    pub min_hz: f32,
    /// Maximum supported carrier frequency in Hz
    pub max_hz: f32,
    /// Carrier frequency a session starts with, in Hz
    pub default_hz: f32,
}

impl CarrierConfig {
    /// Whether `hz` lies inside the supported band (inclusive).
    pub fn contains(&self, hz: f32) -> bool {
        hz >= self.min_hz && hz <= self.max_hz
    }
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            min_hz: 17_000.0,
            max_hz: 20_000.0,
            default_hz: 18_000.0,
        }
    }
}

/// Sample feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Ring capacity of the SPSC sample feed
    pub capacity: usize,
    /// Polling cadence producers are expected to use, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            poll_interval_ms: 100,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            classifier: ClassifierConfig::default(),
            carrier: CarrierConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or defaults if the file is missing or the
    /// JSON is invalid.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the conventional asset path
    pub fn load() -> Self {
        Self::load_from_file("assets/gesture_config.json")
    }
}
