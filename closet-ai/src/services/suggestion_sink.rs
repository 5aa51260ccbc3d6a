//! Fire-and-forget persistence of generated suggestions
//!
//! `SuggestionSink::emit` is synchronous and must return immediately. Slow
//! or fallible storage is pushed onto a spawned task by `StoreSink`; a
//! failure there is logged and never reaches the generator.

use crate::models::OutfitSuggestion;
use async_trait::async_trait;
use closet_common::events::{ClosetEvent, EventBus};
use std::sync::Arc;
use tracing::{debug, warn};

/// Receiver for each suggestion as it is created
pub trait SuggestionSink: Send + Sync {
    fn emit(&self, suggestion: &OutfitSuggestion);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SuggestionSink for NullSink {
    fn emit(&self, _suggestion: &OutfitSuggestion) {}
}

impl SuggestionSink for EventBus {
    fn emit(&self, suggestion: &OutfitSuggestion) {
        self.emit_lossy(ClosetEvent::SuggestionCreated {
            suggestion_id: suggestion.id(),
            top_id: suggestion.top_id().to_string(),
            bottom_id: suggestion.bottom_id().to_string(),
            score: suggestion.score(),
            match_reason: suggestion.match_reason().to_string(),
            timestamp: chrono::Utc::now(),
        });
    }
}

/// Asynchronous suggestion store (database, remote API, ...)
#[async_trait]
pub trait SuggestionStore: Send + Sync + 'static {
    async fn save(&self, suggestion: OutfitSuggestion) -> anyhow::Result<()>;
}

/// Sink that hands each suggestion to a `SuggestionStore` on a spawned task
pub struct StoreSink<S: SuggestionStore> {
    store: Arc<S>,
}

impl<S: SuggestionStore> StoreSink<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }
}

impl<S: SuggestionStore> SuggestionSink for StoreSink<S> {
    fn emit(&self, suggestion: &OutfitSuggestion) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(
                suggestion_id = %suggestion.id(),
                "No async runtime available, suggestion not persisted"
            );
            return;
        };

        let store = Arc::clone(&self.store);
        let suggestion = suggestion.clone();
        handle.spawn(async move {
            let id = suggestion.id();
            match store.save(suggestion).await {
                Ok(()) => debug!(suggestion_id = %id, "Suggestion persisted"),
                Err(e) => warn!(suggestion_id = %id, error = %e, "Failed to persist suggestion"),
            }
        });
    }
}
