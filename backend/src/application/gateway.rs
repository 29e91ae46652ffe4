//! Completion gateway.
//!
//! Issues exactly one model call per invocation and delivers the output
//! either as one complete string or as a finite stream of tagged events.
//!
//! # Streaming lifecycle
//!
//! ```text
//! Idle ──first poll──▶ Requested ──ok──▶ Streaming(n) ──end──▶ Completed
//!                          │                  │
//!                          └──err──▶ Failed ◀─┘ err
//! ```
//!
//! The provider call is issued on the first poll of the event stream, one
//! chunk is pulled per event, and both terminal states end the stream.
//! Dropping the event stream at any point drops the provider stream with it.

use futures::stream::{self, Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::conversation::ConversationTurn;
use crate::ports::{ChunkStream, CompletionProvider, CompletionRequest, ProviderError};

/// Event stream returned by [`CompletionGateway::complete_stream`].
pub type CompletionEventStream = Pin<Box<dyn Stream<Item = CompletionEvent> + Send>>;

/// One element of an incremental completion.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    /// Non-empty text as produced by the provider.
    Fragment(String),
    /// The provider finished; no more events follow.
    End,
    /// The call failed; no more events follow.
    Error(GatewayError),
}

impl CompletionEvent {
    /// Returns true for `End` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::Error(_))
    }
}

/// Failures surfaced by the gateway.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GatewayError {
    /// The provider call failed before any output was delivered.
    #[error("provider call failed: {0}")]
    Provider(#[source] ProviderError),

    /// The provider failed after some fragments were already delivered.
    #[error("stream failed after {delivered} fragments: {source}")]
    PartialDelivery {
        /// Fragments delivered before the failure.
        delivered: usize,
        #[source]
        source: ProviderError,
    },
}

/// Stateless gateway over an injected provider.
///
/// Holds only call settings shared by every request (model, thinking
/// budget); conversation state travels in each [`ConversationTurn`].
pub struct CompletionGateway<P: ?Sized + CompletionProvider> {
    provider: Arc<P>,
    model: String,
    thinking_budget: Option<u32>,
}

impl<P: ?Sized + CompletionProvider> Clone for CompletionGateway<P> {
    fn clone(&self) -> Self {
        Self {
            provider: self.provider.clone(),
            model: self.model.clone(),
            thinking_budget: self.thinking_budget,
        }
    }
}

impl<P: ?Sized + CompletionProvider> CompletionGateway<P> {
    pub fn new(provider: Arc<P>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            thinking_budget: None,
        }
    }

    /// Sets the thinking budget sent with every call.
    pub fn with_thinking_budget(mut self, budget: u32) -> Self {
        self.thinking_budget = Some(budget);
        self
    }

    fn build_request(
        &self,
        turn: ConversationTurn,
        system_instruction: Option<&str>,
        temperature: f32,
    ) -> CompletionRequest {
        let mut request = CompletionRequest::new(&self.model, turn, temperature);
        if let Some(instruction) = system_instruction {
            request = request.with_system_instruction(instruction);
        }
        if let Some(budget) = self.thinking_budget {
            request = request.with_thinking_budget(budget);
        }
        request
    }

    /// Waits for a complete response.
    ///
    /// An empty provider text is returned as `""`. Failures are not retried.
    pub async fn complete_once(
        &self,
        turn: ConversationTurn,
        system_instruction: Option<&str>,
        temperature: f32,
    ) -> Result<String, GatewayError> {
        let span = tracing::info_span!(
            "completion",
            request_id = %Uuid::new_v4(),
            provider = self.provider.name(),
            model = %self.model,
            history = turn.history().len(),
            mode = "once",
        );
        let request = self.build_request(turn, system_instruction, temperature);

        async move {
            match self.provider.complete(request).await {
                Ok(response) => {
                    tracing::debug!(
                        usage = ?response.usage,
                        finish_reason = ?response.finish_reason,
                        chars = response.content.len(),
                        "Completion finished"
                    );
                    Ok(response.content)
                }
                Err(err) => {
                    tracing::error!(error = %err, "Completion failed");
                    Err(GatewayError::Provider(err))
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl<P: ?Sized + CompletionProvider + 'static> CompletionGateway<P> {
    /// Starts an incremental completion.
    ///
    /// Nothing is sent to the provider until the returned stream is first
    /// polled. The stream yields zero or more `Fragment`s followed by exactly
    /// one `End` or `Error`.
    pub fn complete_stream(
        &self,
        turn: ConversationTurn,
        system_instruction: Option<&str>,
        temperature: f32,
    ) -> CompletionEventStream {
        let span = tracing::info_span!(
            "completion",
            request_id = %Uuid::new_v4(),
            provider = self.provider.name(),
            model = %self.model,
            history = turn.history().len(),
            mode = "stream",
        );
        let initial = StreamPhase::Requested {
            provider: self.provider.clone(),
            request: self.build_request(turn, system_instruction, temperature),
        };

        let events = stream::unfold(initial, move |phase| {
            let span = span.clone();
            async move {
                match phase {
                    StreamPhase::Requested { provider, request } => {
                        match provider.stream_complete(request).await {
                            Ok(chunks) => next_event(chunks, 0).await,
                            Err(err) => {
                                tracing::error!(error = %err, "Stream could not be established");
                                Some((
                                    CompletionEvent::Error(GatewayError::Provider(err)),
                                    StreamPhase::Finished,
                                ))
                            }
                        }
                    }
                    StreamPhase::Streaming { chunks, delivered } => {
                        next_event(chunks, delivered).await
                    }
                    StreamPhase::Finished => None,
                }
            }
            .instrument(span)
        });

        Box::pin(events)
    }
}

enum StreamPhase<P: ?Sized> {
    Requested {
        provider: Arc<P>,
        request: CompletionRequest,
    },
    Streaming {
        chunks: ChunkStream,
        delivered: usize,
    },
    Finished,
}

/// Pulls chunks until one yields an event.
async fn next_event<P: ?Sized>(
    mut chunks: ChunkStream,
    delivered: usize,
) -> Option<(CompletionEvent, StreamPhase<P>)> {
    loop {
        match chunks.next().await {
            Some(Ok(chunk)) if chunk.delta.is_empty() => continue,
            Some(Ok(chunk)) => {
                return Some((
                    CompletionEvent::Fragment(chunk.delta),
                    StreamPhase::Streaming {
                        chunks,
                        delivered: delivered + 1,
                    },
                ));
            }
            Some(Err(err)) => {
                let error = if delivered == 0 {
                    tracing::error!(error = %err, "Stream failed before first fragment");
                    GatewayError::Provider(err)
                } else {
                    tracing::error!(error = %err, delivered, "Stream failed mid-delivery");
                    GatewayError::PartialDelivery {
                        delivered,
                        source: err,
                    }
                };
                return Some((CompletionEvent::Error(error), StreamPhase::Finished));
            }
            None => {
                tracing::debug!(delivered, "Stream completed");
                return Some((CompletionEvent::End, StreamPhase::Finished));
            }
        }
    }
}
