//! Domain event system — decoupled observation of the assistant pipeline.
//!
//! Events are published when a turn moves through the pipeline, when a
//! translation degrades, or when session state changes. Front ends and
//! diagnostics subscribe without coupling to the orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A user message was accepted as a new pending turn
    TurnSubmitted {
        turn_id: String,
        content_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The orchestrator produced an answer
    AnswerGenerated {
        mode: String,
        detected_language: String,
        recovered: bool,
        retry: bool,
        timestamp: DateTime<Utc>,
    },

    /// A translation step fell back to the untranslated text
    TranslationDegraded {
        stage: String, // "bridge" or "recover"
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Generation failed and the user saw the apology message
    GenerationFailed {
        mode: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },

    /// The active mode was switched
    ModeChanged {
        from: String,
        to: String,
        timestamp: DateTime<Utc>,
    },

    /// Turns and conversation context were cleared
    ContextCleared { timestamp: DateTime<Utc> },
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
