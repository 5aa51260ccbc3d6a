//! Event types for the Closet Fusion event system
//!
//! Provides shared event definitions and the EventBus used to publish
//! suggestion-generation progress to any interested listener (UI bridge,
//! persistence writer, diagnostics).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Closet Fusion event types
///
/// Events are broadcast via EventBus and can be serialized for transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClosetEvent {
    /// One outfit suggestion finished scoring
    ///
    /// Triggers:
    /// - Persistence: store the suggestion (best effort)
    SuggestionCreated {
        /// Suggestion UUID
        suggestion_id: Uuid,
        /// Top item id
        top_id: String,
        /// Bottom item id
        bottom_id: String,
        /// Final score (0.0-1.0)
        score: f64,
        /// Human-readable justification
        match_reason: String,
        /// When the suggestion was created
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Consecutive oracle failures disabled the oracle for the rest of a run
    OracleCircuitOpened {
        /// Generation run UUID
        run_id: Uuid,
        /// Consecutive failures observed when the breaker opened
        consecutive_failures: u32,
        /// When the breaker opened
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A generation run completed
    SuggestionsGenerated {
        /// Generation run UUID
        run_id: Uuid,
        /// Number of suggestions produced
        count: usize,
        /// Pairs that received an oracle score
        oracle_scored: usize,
        /// Pairs skipped because of invalid items
        skipped: usize,
        /// When the run completed
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ClosetEvent {
    /// Event type name (matches the serde tag)
    pub fn event_type(&self) -> &str {
        match self {
            ClosetEvent::SuggestionCreated { .. } => "SuggestionCreated",
            ClosetEvent::OracleCircuitOpened { .. } => "OracleCircuitOpened",
            ClosetEvent::SuggestionsGenerated { .. } => "SuggestionsGenerated",
        }
    }
}

/// Broadcast event bus
///
/// Uses tokio::broadcast internally:
/// - Non-blocking sends (slow subscribers lag, they never block the sender)
/// - Any number of subscribers
/// - Events emitted before subscription are not received
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ClosetEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Examples
    ///
    /// ```
    /// use closet_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<ClosetEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: ClosetEvent,
    ) -> Result<usize, broadcast::error::SendError<ClosetEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: ClosetEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
