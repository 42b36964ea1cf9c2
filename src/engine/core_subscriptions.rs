use std::sync::atomic::Ordering;
use std::time::Instant;

use futures::Stream;
use tokio::runtime::Builder;
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::SessionEvent;
use crate::analysis::{GestureDecision, TickMetrics};
use crate::config::AppConfig;

use super::SessionHandle;

impl SessionHandle {
    // ========================================================================
    // STREAM SUBSCRIPTIONS
    // ========================================================================

    pub fn subscribe_decisions(&self) -> mpsc::UnboundedReceiver<GestureDecision> {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Some(mut broadcast_rx) = self.broadcasts.subscribe_decisions() {
            std::thread::spawn(move || {
                let rt = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("Failed to create Tokio runtime");
                rt.block_on(async move {
                    while let Ok(decision) = broadcast_rx.recv().await {
                        if tx.send(decision).is_err() {
                            break;
                        }
                    }
                });
            });
        }

        rx
    }

    pub fn subscribe_tick_metrics(&self) -> mpsc::UnboundedReceiver<TickMetrics> {
        let (tx, rx) = mpsc::unbounded_channel();

        if let Some(mut broadcast_rx) = self.broadcasts.subscribe_tick_metrics() {
            std::thread::spawn(move || {
                let rt = Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("Failed to create Tokio runtime");
                rt.block_on(async move {
                    while let Ok(metrics) = broadcast_rx.recv().await {
                        if tx.send(metrics).is_err() {
                            break;
                        }
                    }
                });
            });
        }

        rx
    }

    pub fn subscribe_session_events(&self) -> mpsc::UnboundedReceiver<SessionEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut broadcast_rx = self.session_tx.subscribe();

        std::thread::spawn(move || {
            let rt = Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create Tokio runtime");
            rt.block_on(async move {
                while let Ok(event) = broadcast_rx.recv().await {
                    if tx.send(event).is_err() {
                        break;
                    }
                }
            });
        });

        rx
    }

    pub fn session_receiver(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    /// Raw broadcast receiver for decisions. `None` before the first `start()`.
    pub fn decision_receiver(&self) -> Option<broadcast::Receiver<GestureDecision>> {
        self.broadcasts.subscribe_decisions()
    }

    /// Raw broadcast receiver for per-tick metrics. `None` before the first `start()`.
    pub fn tick_metrics_receiver(&self) -> Option<broadcast::Receiver<TickMetrics>> {
        self.broadcasts.subscribe_tick_metrics()
    }

    // ========================================================================
    // ASYNC STREAM ADAPTERS
    // ========================================================================

    pub async fn decision_stream(&self) -> impl Stream<Item = GestureDecision> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_decisions())
    }

    pub async fn tick_metrics_stream(&self) -> impl Stream<Item = TickMetrics> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_tick_metrics())
    }

    pub async fn session_event_stream(&self) -> impl Stream<Item = SessionEvent> + Unpin {
        UnboundedReceiverStream::new(self.subscribe_session_events())
    }

    // ========================================================================
    // STATE HELPERS
    // ========================================================================

    /// Check whether a classification session is running.
    pub fn is_running(&self) -> bool {
        self.session_running.load(Ordering::SeqCst)
    }

    /// Milliseconds elapsed since the handle was created (used for events).
    pub fn uptime_ms(&self) -> u64 {
        Instant::now()
            .saturating_duration_since(self.start_instant)
            .as_millis() as u64
    }

    /// Snapshot the current app configuration (tooling helper).
    pub fn config_snapshot(&self) -> AppConfig {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .unwrap_or_else(|err| err.into_inner().clone())
    }
}
