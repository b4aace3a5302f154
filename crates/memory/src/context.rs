//! Sliding conversation context, the bounded memory of one session.
//!
//! Stores prior turns as ordered [`ContextEntry`] pairs (user, assistant).
//! The store is:
//!
//! - **Bounded**: capped at `2 × max_context_turns` entries, oldest evicted first
//! - **Lazily trimmed**: the cap comes from the mode active at append time, so
//!   switching to a smaller mode shrinks history on the next append, not before
//! - **Renderable**: yields `"<Role>: <content>"` lines for prompt assembly

use std::collections::VecDeque;
use lingobridge_core::message::{ContextEntry, Role};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ordered, bounded store of prior turns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationContext {
    entries: VecDeque<ContextEntry>,
}

impl ConversationContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user/assistant pair, then evict from the front until at most
    /// `2 × max_turns` entries remain. Returns the number of evicted entries.
    pub fn append_turn(
        &mut self,
        user_text: impl Into<String>,
        assistant_text: impl Into<String>,
        max_turns: usize,
    ) -> usize {
        self.entries.push_back(ContextEntry::user(user_text));
        self.entries.push_back(ContextEntry::assistant(assistant_text));

        let cap = max_turns.saturating_mul(2);
        let mut evicted = 0;
        while self.entries.len() > cap {
            self.entries.pop_front();
            evicted += 1;
        }

        if evicted > 0 {
            debug!(evicted, cap, "Trimmed conversation context");
        }
        evicted
    }

    /// Replace the answer of the latest turn if that turn asked `user_text`.
    ///
    /// Returns `false` (and changes nothing) when the latest stored turn is a
    /// different question, e.g. because the original answer was never recorded.
    pub fn replace_last_answer(&mut self, user_text: &str, assistant_text: impl Into<String>) -> bool {
        if !self.latest_turn_asked(user_text) {
            return false;
        }
        self.entries.pop_back();
        self.entries.push_back(ContextEntry::assistant(assistant_text));
        true
    }

    /// Whether the newest stored pair is the answered turn for `user_text`.
    pub fn latest_turn_asked(&self, user_text: &str) -> bool {
        let len = self.entries.len();
        if len < 2 {
            return false;
        }
        let (question, answer) = (&self.entries[len - 2], &self.entries[len - 1]);
        question.role() == Role::User
            && answer.role() == Role::Assistant
            && question.content() == user_text
    }

    /// The most recent `limit` entries as prompt lines, oldest first.
    ///
    /// The returned iterator is lazy and `Clone`, so it can be restarted.
    pub fn render(&self, limit: usize) -> impl Iterator<Item = String> + Clone + '_ {
        self.render_window(limit, 0)
    }

    /// Like [`render`](Self::render) but ignoring the newest stored turn.
    ///
    /// Used when re-answering that turn so the model does not see its own
    /// previous answer to the same question.
    pub fn render_before_latest_turn(
        &self,
        limit: usize,
    ) -> impl Iterator<Item = String> + Clone + '_ {
        self.render_window(limit, 2)
    }

    fn render_window(
        &self,
        limit: usize,
        skip_newest: usize,
    ) -> impl Iterator<Item = String> + Clone + '_ {
        let end = self.entries.len().saturating_sub(skip_newest);
        let start = end.saturating_sub(limit);
        self.entries
            .range(start..end)
            .map(ContextEntry::render)
    }

    /// Stored entries, oldest first.
    pub fn entries(&self) -> impl Iterator<Item = &ContextEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of complete user/assistant pairs stored.
    pub fn turns(&self) -> usize {
        self.entries.len() / 2
    }

    /// Drop all history.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
