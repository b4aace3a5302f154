//! Conversation memory for LingoBridge sessions.
//!
//! Memory is process/session-lifetime only; nothing is persisted.

pub mod context;

pub use context::ConversationContext;
