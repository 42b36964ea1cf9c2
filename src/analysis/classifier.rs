// GestureClassifier - Doppler-shift motion decisions from the peak-frequency stream
//
// This module turns validated peak samples into one of three motion states by
// smoothing the frequency stream and comparing the change against the last
// accepted frequency:
//
// Approaching: change rose past the motion threshold (positive Doppler shift)
// Receding:    change fell past the motion threshold (negative Doppler shift)
// Stationary:  change stayed inside the hysteresis band
//
// Between the hysteresis band and the motion threshold lies a dead zone that
// emits no state and leaves the previous one standing. Decisions are paced by
// a debounce interval measured on sample timestamps, so cadence changes in the
// front end never alter the decision rate.

use crate::analysis::smoothing::SmoothingFilter;
use crate::config::ClassifierConfig;
use crate::error::SampleError;
use crate::feed::PeakSample;
use std::time::{Duration, Instant};

/// GestureState represents the three reportable motion states
///
/// Observers only ever receive these three; the dead zone between the
/// hysteresis band and the motion threshold reports nothing and the previous
/// state remains displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureState {
    /// Hand moving toward the microphone (peak frequency rising)
    Approaching,
    /// Hand moving away from the microphone (peak frequency falling)
    Receding,
    /// No motion beyond the noise band
    Stationary,
}

/// A single emitted motion decision
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GestureDecision {
    /// Motion state chosen by the threshold test
    pub state: GestureState,
    /// Smoothed peak frequency that produced the decision (Hz)
    pub smoothed_hz: f32,
    /// Change against the previously accepted frequency (Hz)
    pub delta_hz: f32,
    /// Milliseconds since the first valid sample of the session
    pub timestamp_ms: u64,
}

/// Per-sample outcome of `GestureClassifier::process`
///
/// Only `Decision` reaches observers; the other variants describe ticks the
/// classifier absorbed without reporting a state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Debounce gate passed and the change crossed a reporting threshold
    Decision(GestureDecision),
    /// Gate passed but the change fell in the dead zone. The previous state
    /// stands; the accepted frequency and decision clock still advance.
    Unchanged {
        smoothed_hz: f32,
        delta_hz: f32,
        timestamp_ms: u64,
    },
    /// Inside the debounce window. Smoothing advanced, nothing else did.
    Debounced { smoothed_hz: f32, timestamp_ms: u64 },
}

impl TickOutcome {
    /// Smoothed frequency produced by this tick, whatever its disposition
    pub fn smoothed_hz(&self) -> f32 {
        match self {
            TickOutcome::Decision(decision) => decision.smoothed_hz,
            TickOutcome::Unchanged { smoothed_hz, .. } => *smoothed_hz,
            TickOutcome::Debounced { smoothed_hz, .. } => *smoothed_hz,
        }
    }

    /// Milliseconds since the first valid sample of the session
    pub fn timestamp_ms(&self) -> u64 {
        match self {
            TickOutcome::Decision(decision) => decision.timestamp_ms,
            TickOutcome::Unchanged { timestamp_ms, .. } => *timestamp_ms,
            TickOutcome::Debounced { timestamp_ms, .. } => *timestamp_ms,
        }
    }
}

/// GestureClassifier applies smoothing, debounce and threshold rules per sample
///
/// Owns all mutable state for one classification session: the smoothing
/// history, the last accepted frequency and the decision clock. Sessions must
/// not share an instance; construct one per sample stream.
pub struct GestureClassifier {
    /// Exponential smoothing over the raw peak-frequency stream
    filter: SmoothingFilter,
    /// Changes below this magnitude count as stationary noise (Hz)
    hysteresis_threshold_hz: f32,
    /// Changes beyond this magnitude count as motion (Hz)
    motion_threshold_hz: f32,
    /// Minimum spacing between gate passes, measured on sample timestamps
    debounce_interval: Duration,
    /// Smoothed frequency accepted at the most recent gate pass
    last_accepted_hz: f32,
    /// Timestamp of the most recent gate pass; None until the first sample,
    /// which is therefore always eligible
    last_decision_at: Option<Instant>,
    /// Timestamp of the most recent accepted sample, for order validation
    last_sample_at: Option<Instant>,
    /// Timestamp of the first valid sample; zero point for `timestamp_ms`
    origin: Option<Instant>,
}

impl GestureClassifier {
    /// Create a classifier with thresholds and pacing taken from config
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            filter: SmoothingFilter::new(config.smoothing_weight, config.history_size),
            hysteresis_threshold_hz: config.hysteresis_threshold_hz,
            motion_threshold_hz: config.motion_threshold_hz,
            debounce_interval: config.debounce_interval(),
            last_accepted_hz: 0.0,
            last_decision_at: None,
            last_sample_at: None,
            origin: None,
        }
    }

    /// Process one sample and report what this tick produced
    ///
    /// Ticks inside the debounce window only advance the smoothing history.
    /// Outside the window the change against the last accepted frequency is
    /// mapped through the threshold rules, and the accepted frequency and
    /// decision clock advance whether or not a state was emitted.
    ///
    /// # Errors
    /// Returns `SampleError` for non-finite or negative frequencies and for
    /// timestamps earlier than the previous sample. A rejected sample leaves
    /// every piece of classifier state untouched.
    pub fn process(&mut self, sample: &PeakSample) -> Result<TickOutcome, SampleError> {
        self.validate(sample)?;

        self.last_sample_at = Some(sample.at);
        let origin = *self.origin.get_or_insert(sample.at);
        let timestamp_ms = sample.at.saturating_duration_since(origin).as_millis() as u64;

        // Smoothing advances on every tick, gated or not
        let smoothed_hz = self.filter.smooth(sample.frequency_hz);

        if let Some(last) = self.last_decision_at {
            if sample.at.saturating_duration_since(last) <= self.debounce_interval {
                return Ok(TickOutcome::Debounced {
                    smoothed_hz,
                    timestamp_ms,
                });
            }
        }

        // The deviation check shares the hysteresis radius but never discards:
        // a flagged sample still classifies, and the change is always taken
        // against the accepted frequency.
        let deviation_hz = (smoothed_hz - sample.frequency_hz).abs();
        if deviation_hz >= self.hysteresis_threshold_hz {
            log::debug!(
                "Smoothed value deviates {:.2} Hz from raw reading at {} ms; sample retained",
                deviation_hz,
                timestamp_ms
            );
        }

        let delta_hz = smoothed_hz - self.last_accepted_hz;
        let outcome = match self.classify_change(delta_hz) {
            Some(state) => TickOutcome::Decision(GestureDecision {
                state,
                smoothed_hz,
                delta_hz,
                timestamp_ms,
            }),
            None => TickOutcome::Unchanged {
                smoothed_hz,
                delta_hz,
                timestamp_ms,
            },
        };

        // Gate passed: accepted frequency and decision clock advance on every
        // branch, dead zone included
        self.last_accepted_hz = smoothed_hz;
        self.last_decision_at = Some(sample.at);

        Ok(outcome)
    }

    /// Three-way threshold test on the smoothed-frequency change
    ///
    /// Returns None for the dead zone between the hysteresis band and the
    /// motion threshold, where neither "moving" nor "stationary" is a safe
    /// call.
    fn classify_change(&self, change: f32) -> Option<GestureState> {
        if change > self.motion_threshold_hz {
            Some(GestureState::Approaching)
        } else if change < -self.motion_threshold_hz {
            Some(GestureState::Receding)
        } else if change.abs() < self.hysteresis_threshold_hz {
            Some(GestureState::Stationary)
        } else {
            None
        }
    }

    /// Boundary validation, performed before any internal state moves
    fn validate(&self, sample: &PeakSample) -> Result<(), SampleError> {
        if !sample.frequency_hz.is_finite() {
            return Err(SampleError::NonFinite {
                value: sample.frequency_hz,
            });
        }
        if sample.frequency_hz < 0.0 {
            return Err(SampleError::Negative {
                value: sample.frequency_hz,
            });
        }
        if let Some(prev) = self.last_sample_at {
            if sample.at < prev {
                let regression_ms = prev.duration_since(sample.at).as_millis() as u64;
                return Err(SampleError::NonMonotonic { regression_ms });
            }
        }
        Ok(())
    }

    /// Smoothed frequency accepted at the most recent gate pass
    pub fn last_accepted_hz(&self) -> f32 {
        self.last_accepted_hz
    }

    /// Number of smoothed values currently held by the filter
    pub fn history_len(&self) -> usize {
        self.filter.len()
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
