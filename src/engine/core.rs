//! SessionHandle: reusable gesture-session orchestration layer.
//!
//! This struct owns the sample feed, the classification worker thread, and
//! the broadcast channels observers subscribe to, shared across CLI and
//! library entry points.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::JoinHandle;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::analysis::spawn_gesture_thread;
use crate::config::AppConfig;
use crate::error::{log_session_error, SessionError};
use crate::feed::{SampleFeed, SampleProducer};
use crate::managers::BroadcastChannelManager;
use crate::telemetry::{self, SessionPhase};

#[path = "core_subscriptions.rs"]
mod core_subscriptions;

/// Session event emitted by the engine core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionEvent {
    pub timestamp_ms: u64,
    pub kind: SessionEventKind,
    pub detail: Option<String>,
}

/// Types of session events supported by the core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEventKind {
    SessionStarted { carrier_hz: f32 },
    SessionStopped,
    CarrierChanged { carrier_hz: f32 },
    Warning,
}

/// Running worker thread plus the flag that tells it to exit.
struct GestureWorkerHandle {
    join: JoinHandle<()>,
    running: Arc<AtomicBool>,
}

/// SessionHandle orchestrates the classification pipeline and shared channels.
pub struct SessionHandle {
    config: Arc<RwLock<AppConfig>>,
    pub(crate) broadcasts: BroadcastChannelManager,
    session_tx: broadcast::Sender<SessionEvent>,
    session_running: AtomicBool,
    carrier_hz: RwLock<f32>,
    producer_slot: Mutex<Option<SampleProducer>>,
    worker: Mutex<Option<GestureWorkerHandle>>,
    start_instant: Instant,
}

impl SessionHandle {
    /// Create a new SessionHandle from the on-disk configuration.
    pub fn new() -> Self {
        Self::from_config(AppConfig::load())
    }

    /// Create a new SessionHandle from an explicit configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self::from_config(config)
    }

    fn from_config(initial_config: AppConfig) -> Self {
        let carrier_hz = initial_config.carrier.default_hz;
        let config = Arc::new(RwLock::new(initial_config));

        let broadcasts = BroadcastChannelManager::new();
        let (session_tx, _) = broadcast::channel(128);

        Self {
            config,
            broadcasts,
            session_tx,
            session_running: AtomicBool::new(false),
            carrier_hz: RwLock::new(carrier_hz),
            producer_slot: Mutex::new(None),
            worker: Mutex::new(None),
            start_instant: Instant::now(),
        }
    }

    fn emit_event(&self, kind: SessionEventKind, detail: Option<String>) {
        let timestamp_ms = Instant::now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64;
        let _ = self.session_tx.send(SessionEvent {
            timestamp_ms,
            kind,
            detail,
        });
    }

    // ========================================================================
    // SESSION LIFECYCLE METHODS
    // ========================================================================

    /// Start a classification session.
    ///
    /// Creates a fresh sample feed and classifier, spawns the worker thread,
    /// and initializes the decision and tick-metrics broadcast channels. The
    /// feed producer is held until the caller claims it via
    /// [`sample_producer`](Self::sample_producer).
    pub fn start(&self) -> Result<(), SessionError> {
        if self
            .session_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            let err = SessionError::AlreadyRunning;
            log_session_error(&err, "start");
            return Err(err);
        }

        let config = self.config_snapshot();
        let channels = SampleFeed::new(config.feed.capacity);
        let decision_tx = self.broadcasts.init_decisions();
        let metrics_tx = Some(self.broadcasts.init_tick_metrics());

        let running = Arc::new(AtomicBool::new(true));
        let join = spawn_gesture_thread(
            channels.consumer,
            config.classifier.clone(),
            decision_tx,
            metrics_tx,
            Some(Arc::clone(&running)),
        );

        match (self.producer_slot.lock(), self.worker.lock()) {
            (Ok(mut producer_slot), Ok(mut worker_slot)) => {
                *producer_slot = Some(channels.producer);
                *worker_slot = Some(GestureWorkerHandle { join, running });
            }
            _ => {
                running.store(false, Ordering::SeqCst);
                self.session_running.store(false, Ordering::SeqCst);
                let err = SessionError::LockPoisoned {
                    component: "producer_slot".to_string(),
                };
                log_session_error(&err, "start");
                return Err(err);
            }
        }

        telemetry::hub().record_session_phase(SessionPhase::SessionStarted);
        let carrier_hz = self.carrier_hz();
        self.emit_event(SessionEventKind::SessionStarted { carrier_hz }, None);
        tracing::info!("[SessionHandle] Session started (carrier {} Hz)", carrier_hz);
        Ok(())
    }

    /// Stop the running session.
    ///
    /// Drops the feed producer, tells the worker to exit, and joins it. The
    /// worker drains any samples still queued before exiting, so decisions
    /// for already-delivered samples are not lost.
    pub fn stop(&self) -> Result<(), SessionError> {
        if !self.session_running.load(Ordering::SeqCst) {
            let err = SessionError::NotRunning;
            log_session_error(&err, "stop");
            return Err(err);
        }

        // Stop delivery before asking the worker to exit
        if let Ok(mut slot) = self.producer_slot.lock() {
            *slot = None;
        }

        let worker = match self.worker.lock() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };

        if let Some(worker) = worker {
            worker.running.store(false, Ordering::SeqCst);
            if worker.join.join().is_err() {
                tracing::warn!("[SessionHandle] Gesture thread panicked before join");
                self.emit_event(
                    SessionEventKind::Warning,
                    Some("Gesture thread panicked before join".to_string()),
                );
            }
        }

        self.session_running.store(false, Ordering::SeqCst);
        telemetry::hub().record_session_phase(SessionPhase::SessionStopped);
        self.emit_event(SessionEventKind::SessionStopped, None);
        tracing::info!("[SessionHandle] Session stopped");
        Ok(())
    }

    /// Claim the feed producer for the running session.
    ///
    /// The feed is single-producer: the first caller owns the producer for
    /// the lifetime of the session and pushes samples from the acoustic
    /// front end (or a synthetic trace).
    pub fn sample_producer(&self) -> Result<SampleProducer, SessionError> {
        let mut slot = self.producer_slot.lock().map_err(|_| {
            let err = SessionError::LockPoisoned {
                component: "producer_slot".to_string(),
            };
            log_session_error(&err, "sample_producer");
            err
        })?;

        slot.take().ok_or_else(|| {
            let err = SessionError::FeedDisconnected {
                reason: "producer already claimed or session not started".to_string(),
            };
            log_session_error(&err, "sample_producer");
            err
        })
    }

    // ========================================================================
    // CARRIER METHODS
    // ========================================================================

    /// Update the reference-tone carrier frequency.
    ///
    /// The classifier never reads the carrier; the session only validates it
    /// against the supported band and reports the change to observers.
    pub fn set_carrier_hz(&self, hz: f32) -> Result<(), SessionError> {
        let carrier = self.config_snapshot().carrier;
        if !carrier.contains(hz) {
            let err = SessionError::CarrierOutOfRange {
                hz,
                min_hz: carrier.min_hz,
                max_hz: carrier.max_hz,
            };
            log_session_error(&err, "set_carrier_hz");
            return Err(err);
        }

        let mut guard = match self.carrier_hz.write() {
            Ok(guard) => guard,
            Err(err) => err.into_inner(),
        };
        *guard = hz;
        drop(guard);

        self.emit_event(SessionEventKind::CarrierChanged { carrier_hz: hz }, None);
        tracing::info!("[SessionHandle] Carrier changed to {} Hz", hz);
        Ok(())
    }

    /// Current carrier frequency in Hz.
    pub fn carrier_hz(&self) -> f32 {
        self.carrier_hz
            .read()
            .map(|hz| *hz)
            .unwrap_or_else(|err| *err.into_inner())
    }
}

// ========================================================================
// TEST HELPERS
// ========================================================================


impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
