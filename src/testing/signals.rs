//! Synthetic Doppler trace generation.
//!
//! The simulator CLI and the integration tests need deterministic peak
//! streams that drive the classifier through known trajectories without
//! touching a live sonar front end. This module defines the declarative
//! trace description (`TraceSpec`), the serializable per-tick record
//! (`TracePoint`) used by trace files, and the seeded generators that
//! expand a spec into concrete samples.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::feed::PeakSample;

/// Ramp slope used by the approach/recede/sweep trajectories. At the
/// default 100 ms cadence this moves the peak by 2 Hz per tick, well past
/// the motion threshold over one debounce window.
const RAMP_RATE_HZ_PER_S: f32 = 20.0;

/// Jitter bound for the stationary trajectory. Stays inside the
/// hysteresis band so a quiet trace never drifts into a motion decision.
const STATIONARY_JITTER_HZ: f32 = 1.0;

/// Jitter bound layered on top of the ramp trajectories.
const RAMP_JITTER_HZ: f32 = 0.5;

/// Jitter bound for the noisy trajectory. Deliberately spans the
/// hysteresis band and the motion threshold so consecutive windows land
/// in different decision branches.
const NOISY_JITTER_HZ: f32 = 6.0;

const BASE_MAGNITUDE_DB: f32 = -30.0;
const MAGNITUDE_JITTER_DB: f32 = 3.0;

/// Declarative description of a synthetic Doppler trace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraceSpec {
    pub pattern: TracePattern,
    #[serde(default = "default_carrier_hz")]
    pub carrier_hz: f32,
    #[serde(default = "default_duration_ms")]
    pub duration_ms: u64,
    #[serde(default = "default_cadence_ms")]
    pub cadence_ms: u64,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

/// Supported deterministic frequency trajectories.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TracePattern {
    /// Peak holds at the carrier with sub-hysteresis jitter.
    Stationary,
    /// Peak ramps upward (target moving toward the emitter).
    Approach,
    /// Peak ramps downward (target moving away).
    Recede,
    /// Peak ramps up for the first half of the trace, back down for the
    /// second half.
    Sweep,
    /// Peak scatters around the carrier with jitter wide enough to cross
    /// both decision thresholds.
    Noisy,
}

/// One tick of a trace file: a frequency peak at a relative offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TracePoint {
    pub offset_ms: u64,
    pub magnitude_db: f32,
    pub frequency_hz: f32,
}

impl TraceSpec {
    /// Expand the trace into points at the configured cadence,
    /// covering offsets `0..=duration_ms`.
    pub fn points(&self) -> Vec<TracePoint> {
        let cadence_ms = self.cadence_ms.max(1);
        let steps = self.duration_ms / cadence_ms;
        let mut rng = StdRng::seed_from_u64(self.seed);

        (0..=steps)
            .map(|step| {
                let offset_ms = step * cadence_ms;
                TracePoint {
                    offset_ms,
                    magnitude_db: BASE_MAGNITUDE_DB
                        + rng.gen_range(-MAGNITUDE_JITTER_DB..MAGNITUDE_JITTER_DB),
                    frequency_hz: self.frequency_at(offset_ms, &mut rng),
                }
            })
            .collect()
    }

    /// Expand the trace into timestamped samples anchored at `origin`.
    pub fn samples(&self, origin: Instant) -> Vec<PeakSample> {
        self.points()
            .iter()
            .map(|point| point.as_sample(origin))
            .collect()
    }

    fn frequency_at(&self, offset_ms: u64, rng: &mut StdRng) -> f32 {
        let elapsed_s = offset_ms as f32 / 1_000.0;
        match self.pattern {
            TracePattern::Stationary => {
                self.carrier_hz + rng.gen_range(-STATIONARY_JITTER_HZ..STATIONARY_JITTER_HZ)
            }
            TracePattern::Approach => {
                self.carrier_hz
                    + RAMP_RATE_HZ_PER_S * elapsed_s
                    + rng.gen_range(-RAMP_JITTER_HZ..RAMP_JITTER_HZ)
            }
            TracePattern::Recede => {
                self.carrier_hz - RAMP_RATE_HZ_PER_S * elapsed_s
                    + rng.gen_range(-RAMP_JITTER_HZ..RAMP_JITTER_HZ)
            }
            TracePattern::Sweep => {
                let half_s = self.duration_ms as f32 / 2_000.0;
                let ramp_hz = if elapsed_s <= half_s {
                    RAMP_RATE_HZ_PER_S * elapsed_s
                } else {
                    RAMP_RATE_HZ_PER_S * (2.0 * half_s - elapsed_s)
                };
                self.carrier_hz + ramp_hz + rng.gen_range(-RAMP_JITTER_HZ..RAMP_JITTER_HZ)
            }
            TracePattern::Noisy => {
                self.carrier_hz + rng.gen_range(-NOISY_JITTER_HZ..NOISY_JITTER_HZ)
            }
        }
    }
}

impl TracePoint {
    /// Materialize the point as a pipeline sample relative to `origin`.
    pub fn as_sample(&self, origin: Instant) -> PeakSample {
        PeakSample {
            at: origin + Duration::from_millis(self.offset_ms),
            magnitude_db: self.magnitude_db,
            frequency_hz: self.frequency_hz,
        }
    }
}

impl fmt::Display for TracePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TracePattern::Stationary => "stationary",
            TracePattern::Approach => "approach",
            TracePattern::Recede => "recede",
            TracePattern::Sweep => "sweep",
            TracePattern::Noisy => "noisy",
        };
        f.write_str(name)
    }
}

impl FromStr for TracePattern {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "stationary" => Ok(TracePattern::Stationary),
            "approach" => Ok(TracePattern::Approach),
            "recede" => Ok(TracePattern::Recede),
            "sweep" => Ok(TracePattern::Sweep),
            "noisy" => Ok(TracePattern::Noisy),
            other => Err(format!(
                "unknown trace pattern '{other}' (expected stationary, approach, recede, sweep, or noisy)"
            )),
        }
    }
}

fn default_carrier_hz() -> f32 {
    18_000.0
}

fn default_duration_ms() -> u64 {
    3_000
}

fn default_cadence_ms() -> u64 {
    100
}

fn default_seed() -> u64 {
    0x5EED_0D0F
}
