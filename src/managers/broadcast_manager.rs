// BroadcastChannelManager: Centralized tokio broadcast channel management
// Single Responsibility: Broadcast channel lifecycle and subscription

use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

use crate::analysis::{GestureDecision, TickMetrics};

/// Manages all tokio broadcast channels
///
/// Single Responsibility: Broadcast channel lifecycle and subscription
///
/// This manager centralizes all broadcast channel creation, storage, and
/// subscription handling. It provides a clean interface for:
/// - Initializing broadcast channels with appropriate buffer sizes
/// - Subscribing to broadcast channels for multiple consumers
/// - Managing channel lifecycle (creation, cleanup)
///
/// # Channel Types
/// - Decisions: Emitted gesture decisions from the classification worker
/// - Tick Metrics: Per-sample diagnostics (raw/smoothed frequency, deviation,
///   disposition) for debug visualization
pub struct BroadcastChannelManager {
    decisions: Arc<Mutex<Option<broadcast::Sender<GestureDecision>>>>,
    tick_metrics: Arc<Mutex<Option<broadcast::Sender<TickMetrics>>>>,
}

impl BroadcastChannelManager {
    /// Create a new BroadcastChannelManager with all channels uninitialized
    ///
    /// Channels must be explicitly initialized via init_* methods before use.
    pub fn new() -> Self {
        Self {
            decisions: Arc::new(Mutex::new(None)),
            tick_metrics: Arc::new(Mutex::new(None)),
        }
    }

    // ========================================================================
    // DECISIONS CHANNEL
    // ========================================================================

    /// Initialize gesture decision broadcast channel
    ///
    /// Returns sender for the classification worker to publish decisions.
    /// Creates a broadcast channel with 100-message buffer to handle burst
    /// traffic.
    ///
    /// # Returns
    /// `broadcast::Sender<GestureDecision>` - Sender for publishing decisions
    ///
    /// # Notes
    /// - Buffer size: 100 messages (decisions arrive at most every 500 ms,
    ///   so this covers long-idle subscribers)
    /// - Multiple subscribers supported via broadcast pattern
    /// - Old messages dropped if buffer fills (lagged subscribers)
    pub fn init_decisions(&self) -> broadcast::Sender<GestureDecision> {
        let (tx, _) = broadcast::channel(100);
        *self.decisions.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to gesture decisions
    ///
    /// Returns a receiver for consuming gesture decisions. Each subscriber
    /// receives independent copies of all messages via the broadcast channel.
    ///
    /// # Returns
    /// `Option<broadcast::Receiver<GestureDecision>>` - Receiver or None if not initialized
    ///
    /// # Notes
    /// - Returns None if init_decisions() not called yet
    /// - Each subscriber gets independent receiver
    pub fn subscribe_decisions(&self) -> Option<broadcast::Receiver<GestureDecision>> {
        self.decisions
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.subscribe())
    }

    // ========================================================================
    // TICK METRICS CHANNEL (DEBUG)
    // ========================================================================

    /// Initialize tick metrics broadcast channel
    ///
    /// Returns sender for the classification worker to publish per-sample
    /// diagnostics. Creates a broadcast channel with 100-message buffer for
    /// metrics streaming.
    ///
    /// # Returns
    /// `broadcast::Sender<TickMetrics>` - Sender for publishing metrics
    ///
    /// # Notes
    /// - Buffer size: 100 messages (one per sample at the polling cadence)
    /// - Used for debug visualization only
    /// - Not part of the critical decision path
    pub fn init_tick_metrics(&self) -> broadcast::Sender<TickMetrics> {
        let (tx, _) = broadcast::channel(100);
        *self.tick_metrics.lock().unwrap() = Some(tx.clone());
        tx
    }

    /// Subscribe to tick metrics
    ///
    /// Returns a receiver for consuming per-sample diagnostics.
    ///
    /// # Returns
    /// `Option<broadcast::Receiver<TickMetrics>>` - Receiver or None if not initialized
    pub fn subscribe_tick_metrics(&self) -> Option<broadcast::Receiver<TickMetrics>> {
        self.tick_metrics
            .lock()
            .unwrap()
            .as_ref()
            .map(|tx| tx.subscribe())
    }
}

impl Default for BroadcastChannelManager {
    fn default() -> Self {
        Self::new()
    }
}
