//! Conversation adapter.
//!
//! Converts a caller-supplied message sequence into the provider's
//! conversation vocabulary and splits it into prior history and the
//! current turn.
//!
//! # Role mapping
//!
//! | Caller role   | Provider role |
//! |---------------|---------------|
//! | `user`        | `user`        |
//! | `assistant`   | `model`       |
//! | anything else | dropped       |
//!
//! Dropping unrecognized roles is defined behavior: a `system` message in
//! the middle of a history is skipped rather than rejected.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::message::{Message, Role};

/// Role in the provider's conversation vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderRole {
    User,
    Model,
}

impl ProviderRole {
    /// Maps a caller role, returning `None` for roles that are not relayed.
    pub fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::User => Some(Self::User),
            Role::Assistant => Some(Self::Model),
            Role::Unrecognized => None,
        }
    }
}

/// A message converted into provider vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderMessage {
    pub role: ProviderRole,
    pub text: String,
}

impl ProviderMessage {
    pub fn new(role: ProviderRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Errors from converting a message sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversationError {
    /// Nothing left after dropping unrecognized roles.
    #[error("No valid messages provided")]
    NoValidMessages,
}

/// History plus current turn, built fresh for every request.
///
/// # Invariants
///
/// - `history` preserves the caller's order
/// - `current` is the text of the last relayed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    history: Vec<ProviderMessage>,
    current: String,
}

impl ConversationTurn {
    /// Converts a caller message sequence.
    ///
    /// # Errors
    ///
    /// Returns [`ConversationError::NoValidMessages`] if the sequence is
    /// empty or contains only unrecognized roles.
    pub fn from_messages(messages: &[Message]) -> Result<Self, ConversationError> {
        let mut converted: Vec<ProviderMessage> = messages
            .iter()
            .filter_map(|message| match ProviderRole::from_role(message.role) {
                Some(role) => Some(ProviderMessage::new(role, message.content.clone())),
                None => {
                    tracing::debug!("Dropping message with unrecognized role");
                    None
                }
            })
            .collect();

        let last = converted.pop().ok_or(ConversationError::NoValidMessages)?;

        Ok(Self {
            history: converted,
            current: last.text,
        })
    }

    /// Builds a turn with no history, for one-shot generation.
    pub fn single(prompt: impl Into<String>) -> Self {
        Self {
            history: Vec::new(),
            current: prompt.into(),
        }
    }

    /// Messages before the current turn.
    pub fn history(&self) -> &[ProviderMessage] {
        &self.history
    }

    /// Text of the current turn.
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Splits into owned parts.
    pub fn into_parts(self) -> (Vec<ProviderMessage>, String) {
        (self.history, self.current)
    }
}
