//! Request and response DTOs for the relay endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::Message;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /chat` and `POST /chat/stream`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub stream: bool,
}

/// Body of `POST /template`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateRequest {
    pub prompt: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

/// Complete model reply.
#[derive(Debug, Clone, Serialize)]
pub struct ReplyResponse {
    pub response: String,
}

/// Prompts for a classified project.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateResponse {
    pub prompts: Vec<String>,
    #[serde(rename = "uiPrompts")]
    pub ui_prompts: Vec<String>,
}

/// Liveness probe body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Error body for non-streaming failures.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn internal() -> Self {
        Self::new(INTERNAL_ERROR_MESSAGE)
    }

    pub fn forbidden() -> Self {
        Self::new("You cant access this")
    }

    pub fn invalid_body() -> Self {
        Self::new(INVALID_BODY_MESSAGE)
    }
}

/// Message shown to callers for any provider failure.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message shown when a request body is not the expected JSON.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body";

// ════════════════════════════════════════════════════════════════════════════════
// Stream payloads
// ════════════════════════════════════════════════════════════════════════════════

/// JSON payload of one SSE `data:` line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StreamPayload {
    Content { content: String },
    Done { done: bool },
    Error { error: String },
}

impl StreamPayload {
    pub fn content(text: impl Into<String>) -> Self {
        Self::Content {
            content: text.into(),
        }
    }

    pub fn done() -> Self {
        Self::Done { done: true }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}
