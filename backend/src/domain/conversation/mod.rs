//! Conversation domain module.
//!
//! Caller-owned message sequences and their conversion into a
//! provider-ready history plus current turn.

mod message;
mod turn;

pub use message::{Message, Role};
pub use turn::{ConversationError, ConversationTurn, ProviderMessage, ProviderRole};
