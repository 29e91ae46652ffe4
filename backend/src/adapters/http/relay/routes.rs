//! Route definitions for the relay endpoints

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{chat, chat_stream, generate, health, select_template, RelayAppState};

/// Create the relay router with all endpoints
///
/// # Endpoints
///
/// - `POST /template` - Classify a project prompt into a starter template
/// - `POST /chat` - Relay a conversation, full reply
/// - `POST /chat/stream` - Relay a conversation as Server-Sent Events
/// - `POST /generate` - One-shot generation, optionally streamed
/// - `GET /health` - Liveness probe
pub fn relay_router() -> Router<RelayAppState> {
    Router::new()
        .route("/template", post(select_template))
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .route("/generate", post(generate))
        .route("/health", get(health))
}
