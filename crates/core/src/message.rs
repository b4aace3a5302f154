//! Conversation value objects.
//!
//! A conversation turn is stored as two [`ContextEntry`] values, one per
//! speaker. Entries are immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The speaker of a context entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
}

impl Role {
    /// The label used when rendering this role into a prompt.
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One side of a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    role: Role,
    content: String,
    created_at: DateTime<Utc>,
}

impl ContextEntry {
    /// Create a user entry.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant entry.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Render as a `"<Role>: <content>"` prompt line.
    pub fn render(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_role_label_and_content() {
        assert_eq!(ContextEntry::user("Hello").render(), "User: Hello");
        assert_eq!(
            ContextEntry::assistant("สวัสดี").render(),
            "Assistant: สวัสดี"
        );
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn entry_serialization_keeps_role() {
        let entry = ContextEntry::user("Test message");
        let json = serde_json::to_string(&entry).unwrap();
        let parsed: ContextEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.role(), Role::User);
        assert_eq!(parsed.content(), "Test message");
    }
}
