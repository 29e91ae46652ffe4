//! Completion Provider Port - Interface for text-generation providers.
//!
//! This port abstracts the remote text-generation service so the completion
//! gateway can issue model calls without coupling to a specific provider.
//!
//! # Design
//!
//! - One call per request, in either single-shot or incremental form
//! - History and current turn travel explicitly in every request
//! - Provider failures are typed; callers decide how much detail to expose
//!
//! # Example
//!
//! ```ignore
//! use async_trait::async_trait;
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl CompletionProvider for EchoProvider {
//!     async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, ProviderError> {
//!         Ok(CompletionResponse::text(request.current, "echo"))
//!     }
//!     // ... stream_complete
//! }
//! ```

use async_trait::async_trait;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

use crate::domain::conversation::{ConversationTurn, ProviderMessage};

/// Incremental output of a streaming completion.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, ProviderError>> + Send>>;

/// Port for text-generation provider interactions.
///
/// Implementations translate between the provider-specific API and these
/// types. Implementations must not retry; a failed call is reported once.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a single completion (non-streaming).
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;

    /// Generate a streaming completion.
    ///
    /// Returns an error if the call cannot be established. Once a stream is
    /// returned, failures arrive as `Err` items. Dropping the stream must
    /// release the underlying connection.
    async fn stream_complete(&self, request: CompletionRequest)
        -> Result<ChunkStream, ProviderError>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}

/// Request for a model call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Model identifier.
    pub model: String,
    /// System instruction guiding model behavior.
    pub system_instruction: Option<String>,
    /// Sampling temperature.
    pub temperature: f32,
    /// Token budget for provider-side reasoning; `Some(0)` disables it.
    pub thinking_budget: Option<u32>,
    /// Messages before the current turn, in conversational order.
    pub history: Vec<ProviderMessage>,
    /// Text of the current user turn.
    pub current: String,
}

impl CompletionRequest {
    /// Creates a request for a conversation turn.
    pub fn new(model: impl Into<String>, turn: ConversationTurn, temperature: f32) -> Self {
        let (history, current) = turn.into_parts();
        Self {
            model: model.into(),
            system_instruction: None,
            temperature,
            thinking_budget: None,
            history,
            current,
        }
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Sets the thinking budget.
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }
}

/// Response from a single completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionResponse {
    /// Generated text; empty when the provider returned no text.
    pub content: String,
    /// Model that generated the response.
    pub model: String,
    /// Why the model stopped generating, if reported.
    pub finish_reason: Option<FinishReason>,
    /// Token usage, if reported.
    pub usage: Option<TokenUsage>,
}

impl CompletionResponse {
    /// Creates a text response without metadata.
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            model: model.into(),
            finish_reason: None,
            usage: None,
        }
    }
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// Reason the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// Natural stop.
    Stop,
    /// Hit the output token limit.
    Length,
    /// Blocked by a safety filter.
    ContentFilter,
    /// Any other provider-specific reason.
    Other,
}

/// One increment of a streaming completion.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamChunk {
    /// New text in this chunk; may be empty.
    pub delta: String,
    /// Present on the last chunk if the provider reports it.
    pub finish_reason: Option<FinishReason>,
}

impl StreamChunk {
    /// Creates a content chunk.
    pub fn content(delta: impl Into<String>) -> Self {
        Self {
            delta: delta.into(),
            finish_reason: None,
        }
    }

    /// Attaches a finish reason.
    pub fn with_finish_reason(mut self, reason: FinishReason) -> Self {
        self.finish_reason = Some(reason);
        self
    }
}

/// Provider errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Rate limited or quota exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request or while streaming.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Provider rejected the request.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },
}

impl ProviderError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
