//! Message value object for relayed conversations.
//!
//! Messages arrive in the caller's wire format (role + content) and are
//! read-only for the rest of the pipeline. Any role other than `user` and
//! `assistant` is accepted on the wire, including a missing or non-string
//! one, and classified as unrecognized so the conversation adapter can skip
//! it. Missing or non-string content reads as empty text.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Role of a message sender as supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User input.
    User,
    /// Assistant (model) response from an earlier turn.
    Assistant,
    /// Any other value (`"system"`, `null`, `42`, typos, ...).
    Unrecognized,
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)?.as_str() {
            Some("user") => Self::User,
            Some("assistant") => Self::Assistant,
            _ => Self::Unrecognized,
        })
    }
}

impl Role {
    /// Returns true if this role takes part in the converted conversation.
    pub fn is_relayed(&self) -> bool {
        matches!(self, Self::User | Self::Assistant)
    }
}

/// An immutable message in a caller-owned conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message.
    #[serde(default = "unrecognized_role")]
    pub role: Role,
    /// Message text.
    #[serde(default, deserialize_with = "text_or_empty")]
    pub content: String,
}

fn unrecognized_role() -> Role {
    Role::Unrecognized
}

fn text_or_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => text,
        _ => String::new(),
    })
}

impl Message {
    /// Creates a new message.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Creates a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Creates an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}
