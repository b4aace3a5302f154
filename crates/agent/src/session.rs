//! Conversation state machine: the front-end view of a session.
//!
//! Tracks each displayed turn through `Pending → Answered` and enforces that
//! at most one turn is in flight. Every generation goes through the owned
//! [`GenerationOrchestrator`], so turns and context stay in step.
//!
//! [`SessionHandle`] wraps a machine in a session-scoped async lock so calls
//! against one session are serialized; [`SessionRegistry`] keeps independent
//! sessions that may run in parallel.

use std::collections::HashMap;
use std::sync::Arc;
use chrono::{DateTime, Utc};
use lingobridge_core::event::DomainEvent;
use lingobridge_core::mode::ModeConfig;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::{debug, info};
use uuid::Uuid;
use crate::orchestrator::{AnswerOutcome, GenerationOrchestrator, TurnKind};

/// Lifecycle of one displayed turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    /// Submitted, no answer yet
    Pending,
    Answered,
}

/// One user message and its answer as shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub user_text: String,
    pub assistant_text: Option<String>,
    pub state: TurnState,
    /// The shown answer is an apology
    pub failed: bool,
    /// An answer for this turn is stored in the context. A later failed
    /// retry leaves the stored pair, so this stays set.
    pub in_context: bool,
    pub submitted_at: DateTime<Utc>,
    pub answered_at: Option<DateTime<Utc>>,
}

impl Turn {
    fn pending(user_text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_text,
            assistant_text: None,
            state: TurnState::Pending,
            failed: false,
            in_context: false,
            submitted_at: Utc::now(),
            answered_at: None,
        }
    }

    fn settle(&mut self, outcome: AnswerOutcome) {
        self.failed = !outcome.is_answered();
        self.in_context |= outcome.is_answered();
        self.assistant_text = Some(outcome.into_text());
        self.state = TurnState::Answered;
        self.answered_at = Some(Utc::now());
    }
}

/// Rejected state-machine operations. None of these change any state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("Message is empty")]
    Empty,

    #[error("A turn is already waiting for an answer")]
    TurnInFlight,

    #[error("No pending turn to answer")]
    NothingPending,

    #[error("No answered turn to retry")]
    NothingToRetry,
}

/// Turn lifecycle for one session.
pub struct ConversationStateMachine {
    orchestrator: GenerationOrchestrator,
    turns: Vec<Turn>,
}

impl ConversationStateMachine {
    pub fn new(orchestrator: GenerationOrchestrator) -> Self {
        Self {
            orchestrator,
            turns: Vec::new(),
        }
    }

    /// Accept a user message as a new pending turn.
    ///
    /// Rejects blank text and submissions while another turn is pending;
    /// rejection creates no turn.
    pub fn submit(&mut self, text: &str) -> Result<&Turn, TurnError> {
        if text.trim().is_empty() {
            return Err(TurnError::Empty);
        }
        if self.pending().is_some() {
            return Err(TurnError::TurnInFlight);
        }

        let turn = Turn::pending(text.to_string());
        debug!(turn_id = %turn.id, "Turn submitted");
        self.orchestrator
            .event_bus()
            .publish(DomainEvent::TurnSubmitted {
                turn_id: turn.id.to_string(),
                content_preview: text.chars().take(100).collect(),
                timestamp: turn.submitted_at,
            });
        let index = self.turns.len();
        self.turns.push(turn);
        Ok(&self.turns[index])
    }

    /// Answer the pending turn.
    pub async fn respond(&mut self) -> Result<&Turn, TurnError> {
        let index = self.pending_index().ok_or(TurnError::NothingPending)?;
        let user_text = self.turns[index].user_text.clone();

        let outcome = self.orchestrator.respond(&user_text, TurnKind::New).await;
        let turn = &mut self.turns[index];
        turn.settle(outcome);
        Ok(&*turn)
    }

    /// Submit and answer in one step.
    pub async fn send(&mut self, text: &str) -> Result<&Turn, TurnError> {
        self.submit(text)?;
        self.respond().await
    }

    /// Re-answer the last turn in place.
    ///
    /// The context keeps one pair for the turn: a recorded answer is replaced,
    /// a turn whose previous attempt failed is recorded now.
    pub async fn retry(&mut self) -> Result<&Turn, TurnError> {
        let Some(index) = self.turns.len().checked_sub(1) else {
            return Err(TurnError::NothingToRetry);
        };
        if self.turns[index].state == TurnState::Pending {
            return Err(TurnError::TurnInFlight);
        }

        let user_text = self.turns[index].user_text.clone();
        let recorded = self.turns[index].in_context
            && self.orchestrator.context().latest_turn_asked(&user_text);

        info!(turn_id = %self.turns[index].id, "Retrying turn");
        let outcome = self
            .orchestrator
            .respond(&user_text, TurnKind::Retry { recorded })
            .await;

        let turn = &mut self.turns[index];
        turn.settle(outcome);
        Ok(&*turn)
    }

    /// Remove all turns and empty the conversation context.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.orchestrator.clear_context();
        info!("Conversation cleared");
        self.orchestrator
            .event_bus()
            .publish(DomainEvent::ContextCleared {
                timestamp: Utc::now(),
            });
    }

    /// Switch the active mode; see [`GenerationOrchestrator::change_mode`].
    pub fn change_mode(&mut self, mode_id: &str) -> bool {
        self.orchestrator.change_mode(mode_id)
    }

    pub fn active_mode(&self) -> &ModeConfig {
        self.orchestrator.active_mode()
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn last_turn(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn pending(&self) -> Option<&Turn> {
        self.pending_index().map(|i| &self.turns[i])
    }

    fn pending_index(&self) -> Option<usize> {
        self.turns
            .iter()
            .rposition(|t| t.state == TurnState::Pending)
    }

    pub fn orchestrator(&self) -> &GenerationOrchestrator {
        &self.orchestrator
    }
}

/// Shared, serialized access to one session.
///
/// Each operation holds the session lock until it completes, so a second
/// `send` waits for the first answer instead of interleaving with it.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<ConversationStateMachine>>,
}

impl SessionHandle {
    pub fn new(machine: ConversationStateMachine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    pub async fn send(&self, text: &str) -> Result<Turn, TurnError> {
        let mut machine = self.inner.lock().await;
        machine.send(text).await.cloned()
    }

    pub async fn retry(&self) -> Result<Turn, TurnError> {
        let mut machine = self.inner.lock().await;
        machine.retry().await.cloned()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn change_mode(&self, mode_id: &str) -> bool {
        self.inner.lock().await.change_mode(mode_id)
    }

    pub async fn turns(&self) -> Vec<Turn> {
        self.inner.lock().await.turns().to_vec()
    }

    /// Direct access for callers that need several operations under one lock.
    pub async fn lock(&self) -> MutexGuard<'_, ConversationStateMachine> {
        self.inner.lock().await
    }
}

type SessionFactory = dyn Fn() -> ConversationStateMachine + Send + Sync;

/// Independent sessions keyed by id, created on first use.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    factory: Box<SessionFactory>,
}

impl SessionRegistry {
    pub fn new(factory: impl Fn() -> ConversationStateMachine + Send + Sync + 'static) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            factory: Box::new(factory),
        }
    }

    /// Get the session for `id`, creating it if needed.
    pub async fn get_or_create(&self, id: &str) -> SessionHandle {
        if let Some(handle) = self.sessions.read().await.get(id) {
            return handle.clone();
        }

        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                debug!(session = %id, "Session created");
                SessionHandle::new((self.factory)())
            })
            .clone()
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
