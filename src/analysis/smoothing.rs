// SmoothingFilter - exponential-weighted smoothing of the peak-frequency stream
//
// Damps single-sample spikes from spectral estimation noise without the
// latency cost of a longer moving average. The weight favors the newest
// reading; the bounded history keeps the last few smoothed values around
// for observers.

use std::collections::VecDeque;

/// Exponential-weighted smoothing over a bounded FIFO history.
///
/// The first call seeds the history and returns the raw value unchanged.
/// Every later call returns `weight * raw + (1 - weight) * previous`, a
/// convex combination, so the result always lies between the previous
/// smoothed value and the new reading.
#[derive(Debug)]
pub struct SmoothingFilter {
    weight: f32,
    history: VecDeque<f32>,
    history_size: usize,
}

impl SmoothingFilter {
    /// Create a filter with the given weight and history capacity.
    ///
    /// # Panics
    /// Panics if `history_size` is 0.
    pub fn new(weight: f32, history_size: usize) -> Self {
        assert!(history_size > 0, "history_size must be greater than 0");
        Self {
            weight,
            history: VecDeque::with_capacity(history_size),
            history_size,
        }
    }

    /// Smooth one raw frequency reading and advance the history.
    ///
    /// Total over all finite floats; no error conditions.
    pub fn smooth(&mut self, raw_hz: f32) -> f32 {
        let smoothed = match self.history.back() {
            None => raw_hz,
            Some(&prev) => self.weight * raw_hz + (1.0 - self.weight) * prev,
        };

        self.history.push_back(smoothed);
        if self.history.len() > self.history_size {
            self.history.pop_front();
        }

        smoothed
    }

    /// Most recent smoothed value, if any sample has been seen.
    pub fn last(&self) -> Option<f32> {
        self.history.back().copied()
    }

    /// Number of smoothed values currently held.
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// True before the first sample has been smoothed.
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
