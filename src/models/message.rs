//! Chat message models

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Message author role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// A single conversation entry.
///
/// A message is immutable once finalized; while an assistant reply is being
/// resolved asynchronously it exists in a transient pending variant
/// (`pending == true`, placeholder content) and is later overwritten in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub content: String,
    pub role: Role,
    pub created_at: String,
    #[serde(default, skip_serializing_if = "is_false")]
    pub pending: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

impl ChatMessage {
    /// Finalized user message with a fresh id.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            role: Role::User,
            created_at: Utc::now().to_rfc3339(),
            pending: false,
        }
    }

    /// Finalized assistant message with a server-assigned id.
    pub fn assistant(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            role: Role::Assistant,
            created_at: Utc::now().to_rfc3339(),
            pending: false,
        }
    }

    /// Assistant message with fixed fallback content (degraded replies).
    pub fn fallback(content: &str) -> Self {
        Self::assistant(Uuid::new_v4().to_string(), content)
    }

    /// Pending assistant placeholder awaiting asynchronous resolution.
    pub fn pending(content: &str) -> Self {
        Self {
            pending: true,
            ..Self::fallback(content)
        }
    }
}
