//! HTTP adapter for the chat relay
//!
//! Exposes the template, chat and generation endpoints over JSON and
//! Server-Sent Events.

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod sse;

pub use dto::*;
pub use handlers::{RelayAppState, RelaySettings};
pub use routes::relay_router;
