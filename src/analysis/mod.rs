// Analysis module - Doppler-shift gesture classification pipeline
//
// This module orchestrates the classification pipeline, processing peak
// samples from the acoustic front end and generating gesture decisions for
// observer streams.
//
// Architecture:
// - GestureThread: Main loop that consumes samples from the SPSC sample feed
// - Pipeline: SmoothingFilter -> GestureClassifier
// - Output: GestureDecision sent via tokio broadcast channel to subscribers,
//   TickMetrics per sample for debug observers

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::ClassifierConfig;
use crate::error::{log_sample_error, ErrorCode};
use crate::feed::{self, SampleConsumer};
use crate::telemetry;
use rtrb::PopError;

pub mod classifier;
pub mod smoothing;

pub use classifier::{GestureClassifier, GestureDecision, GestureState, TickOutcome};
pub use smoothing::SmoothingFilter;

/// Progress log cadence; roughly every 10 s at the reference polling rate
const LOG_EVERY_N_SAMPLES: u64 = 100;

/// How a processed sample was dispatched by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickDisposition {
    /// A gesture decision was emitted to observers
    Emitted,
    /// Gate passed but the change landed in the dead zone
    DeadZone,
    /// Suppressed by the debounce window
    Debounced,
}

/// Per-sample diagnostics published on the tick metrics channel
///
/// One event per processed sample, regardless of whether a decision was
/// emitted. `deviation_hz` is the gap between the smoothed and raw reading;
/// `outlier` marks samples where that gap reached the hysteresis threshold.
/// Such samples still classify normally, the flag only surfaces them.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TickMetrics {
    /// Raw peak frequency reported by the front end (Hz)
    pub raw_hz: f32,
    /// Smoothed peak frequency after this sample (Hz)
    pub smoothed_hz: f32,
    /// Peak magnitude reported by the front end (dB)
    pub magnitude_db: f32,
    /// Absolute gap between smoothed and raw frequency (Hz)
    pub deviation_hz: f32,
    /// True when the deviation reached the hysteresis threshold
    pub outlier: bool,
    /// What the classifier did with this sample
    pub disposition: TickDisposition,
    /// Milliseconds since the first valid sample of the session
    pub timestamp_ms: u64,
}

struct GestureWorker {
    // Channels & Config
    feed: SampleConsumer,
    decision_tx: tokio::sync::broadcast::Sender<GestureDecision>,
    metrics_tx: Option<tokio::sync::broadcast::Sender<TickMetrics>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
    hysteresis_threshold_hz: f32,

    // Pipeline
    classifier: GestureClassifier,

    // State
    processed_samples: u64,
    emitted_decisions: u64,
    rejected_samples: u64,
}

impl GestureWorker {
    fn new(
        feed: SampleConsumer,
        config: &ClassifierConfig,
        decision_tx: tokio::sync::broadcast::Sender<GestureDecision>,
        metrics_tx: Option<tokio::sync::broadcast::Sender<TickMetrics>>,
        shutdown_flag: Option<Arc<AtomicBool>>,
    ) -> Self {
        let classifier = GestureClassifier::new(config);

        Self {
            feed,
            decision_tx,
            metrics_tx,
            shutdown_flag,
            hysteresis_threshold_hz: config.hysteresis_threshold_hz,
            classifier,
            processed_samples: 0,
            emitted_decisions: 0,
            rejected_samples: 0,
        }
    }

    fn process_sample(&mut self, sample: &crate::feed::PeakSample) {
        let outcome = match self.classifier.process(sample) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.rejected_samples += 1;
                log_sample_error(&err, "GestureThread");
                telemetry::hub().record_invalid_sample(err.code(), err.message());
                return;
            }
        };

        let smoothed_hz = outcome.smoothed_hz();
        let timestamp_ms = outcome.timestamp_ms();
        let deviation_hz = (smoothed_hz - sample.frequency_hz).abs();

        let disposition = match outcome {
            TickOutcome::Decision(decision) => {
                tracing::debug!(
                    "[GestureThread] Decision {:?} at {} ms (delta {:+.2} Hz)",
                    decision.state,
                    decision.timestamp_ms,
                    decision.delta_hz
                );
                telemetry::hub().record_decision(&decision);
                let _ = self.decision_tx.send(decision);
                self.emitted_decisions += 1;
                TickDisposition::Emitted
            }
            TickOutcome::Unchanged { delta_hz, .. } => {
                tracing::debug!(
                    "[GestureThread] Dead-zone change {:+.2} Hz at {} ms, previous state retained",
                    delta_hz,
                    timestamp_ms
                );
                TickDisposition::DeadZone
            }
            TickOutcome::Debounced { .. } => TickDisposition::Debounced,
        };

        if let Some(ref tx) = self.metrics_tx {
            let metrics = TickMetrics {
                raw_hz: sample.frequency_hz,
                smoothed_hz,
                magnitude_db: sample.magnitude_db,
                deviation_hz,
                outlier: deviation_hz >= self.hysteresis_threshold_hz,
                disposition,
                timestamp_ms,
            };
            let _ = tx.send(metrics);
        }
    }

    fn run(mut self) {
        tracing::info!("[GestureThread] Starting classification loop");

        loop {
            // Attempt to pop from the sample feed
            let sample = match self.feed.pop() {
                Ok(sample) => sample,
                Err(PopError::Empty) => {
                    // Check shutdown flag only when the feed is empty, so
                    // queued samples are always drained before exit
                    if let Some(flag) = self.shutdown_flag.as_ref() {
                        if !flag.load(Ordering::SeqCst) {
                            tracing::info!(
                                "[GestureThread] Shutdown flag cleared and feed empty, exiting"
                            );
                            break;
                        }
                    }
                    // Small sleep to avoid busy loop when empty
                    std::thread::sleep(std::time::Duration::from_millis(1));
                    continue;
                }
            };

            self.processed_samples += 1;

            let occupancy = feed::occupancy_percent(&self.feed);
            telemetry::hub().record_feed_occupancy("sample_feed", occupancy);

            self.process_sample(&sample);

            if self.processed_samples.is_multiple_of(LOG_EVERY_N_SAMPLES) {
                tracing::info!(
                    "[GestureThread] Processed {} samples ({} decisions, {} rejected)",
                    self.processed_samples,
                    self.emitted_decisions,
                    self.rejected_samples
                );
            }
        }

        telemetry::hub().record_session_phase(telemetry::SessionPhase::WorkerExited);
        tracing::info!(
            "[GestureThread] Exiting after {} samples ({} decisions, {} rejected)",
            self.processed_samples,
            self.emitted_decisions,
            self.rejected_samples
        );
    }
}

/// Spawn the classification thread consuming from `feed`
///
/// The thread drains the sample feed, classifies each sample, and publishes
/// decisions on `decision_tx` and optional per-tick diagnostics on
/// `metrics_tx`. It exits when `shutdown_flag` reads false and the feed is
/// empty (None runs until the process exits).
pub fn spawn_gesture_thread(
    feed: SampleConsumer,
    config: ClassifierConfig,
    decision_tx: tokio::sync::broadcast::Sender<GestureDecision>,
    metrics_tx: Option<tokio::sync::broadcast::Sender<TickMetrics>>,
    shutdown_flag: Option<Arc<AtomicBool>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        telemetry::hub().record_session_phase(telemetry::SessionPhase::WorkerSpawned);
        let worker = GestureWorker::new(feed, &config, decision_tx, metrics_tx, shutdown_flag);
        worker.run();
    })
}
