//! Gemini Provider - Implementation of CompletionProvider for Google's Gemini API.
//!
//! Speaks the `generateContent` REST API with streaming completions via SSE.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.5-flash")
//!     .with_base_url("https://generativelanguage.googleapis.com");
//!
//! let provider = GeminiProvider::new(config)?;
//! ```
//!
//! # Streaming
//!
//! `streamGenerateContent?alt=sse` returns Server-Sent Events whose `data:`
//! lines each carry a full `GenerateContentResponse`. Network chunks do not
//! respect line boundaries, so bytes are buffered until a complete line is
//! available. A `data:` payload carrying an `error` object, or a body that
//! ends in the middle of a line, is a stream failure.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::conversation::{ProviderMessage, ProviderRole};
use crate::ports::{
    ChunkStream, CompletionProvider, CompletionRequest, CompletionResponse, FinishReason,
    ProviderError, StreamChunk, TokenUsage,
};

const API_VERSION: &str = "v1beta";

/// Configuration for the Gemini provider.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "gemini-2.5-flash").
    pub model: String,
    /// Base URL for the API, without version path.
    pub base_url: String,
    /// Total timeout for single completions.
    pub timeout: Duration,
    /// Connection timeout for every call, including streams.
    pub connect_timeout: Duration,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout: Duration::from_secs(120),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets the single-completion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the connection timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API provider implementation.
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Creates a new Gemini provider with the given configuration.
    pub fn new(config: GeminiConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| ProviderError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Builds a model method URL, e.g. `.../models/gemini-2.5-flash:generateContent`.
    fn method_url(&self, model: &str, method: &str) -> String {
        format!(
            "{}/{}/models/{}:{}",
            self.config.base_url, API_VERSION, model, method
        )
    }

    fn post(&self, url: String, body: &GenerateContentRequest) -> RequestBuilder {
        self.client
            .post(url)
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(body)
    }

    /// Sends a request and maps transport failures.
    ///
    /// `timeout` is the limit that applies to this request, reported when
    /// it elapses.
    async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, ProviderError> {
        let response = request
            .send()
            .await
            .map_err(|e| Self::map_transport_error(e, timeout))?;
        Self::handle_response_status(response).await
    }

    fn map_transport_error(e: reqwest::Error, timeout: Duration) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                timeout_secs: timeout.as_secs(),
            }
        } else if e.is_connect() {
            ProviderError::network(format!("Connection failed: {}", e))
        } else {
            ProviderError::network(e.to_string())
        }
    }

    /// Parses the API response status and handles errors.
    async fn handle_response_status(response: Response) -> Result<Response, ProviderError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        tracing::warn!(status = %status, "Gemini returned an error status");

        match status.as_u16() {
            401 | 403 => Err(ProviderError::AuthenticationFailed),
            429 => Err(ProviderError::RateLimited(Self::error_message(&error_body))),
            400 => Err(ProviderError::InvalidRequest(Self::error_message(&error_body))),
            500..=599 => Err(ProviderError::unavailable(format!(
                "Server error {}: {}",
                status,
                Self::error_message(&error_body)
            ))),
            _ => Err(ProviderError::network(format!(
                "Unexpected status {}: {}",
                status, error_body
            ))),
        }
    }

    /// Extracts `error.message` from an error body, falling back to the raw body.
    fn error_message(error_body: &str) -> String {
        serde_json::from_str::<ErrorEnvelope>(error_body)
            .map(|envelope| envelope.error.message)
            .unwrap_or_else(|_| error_body.to_string())
    }
}

#[async_trait]
impl CompletionProvider for GeminiProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        let url = self.method_url(&request.model, "generateContent");
        let body = GenerateContentRequest::from(&request);

        let timeout = self.config.timeout;
        let response = self
            .send(self.post(url, &body).timeout(timeout), timeout)
            .await?;

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::parse(format!("Failed to parse response: {}", e)))?;

        if let Some(error) = parsed.error {
            return Err(ProviderError::unavailable(error.message));
        }

        Ok(parsed.into_completion(&request.model))
    }

    async fn stream_complete(
        &self,
        request: CompletionRequest,
    ) -> Result<ChunkStream, ProviderError> {
        let url = format!(
            "{}?alt=sse",
            self.method_url(&request.model, "streamGenerateContent")
        );
        let body = GenerateContentRequest::from(&request);

        // Streams have no total timeout; only connecting is bounded.
        let response = self
            .send(self.post(url, &body), self.config.connect_timeout)
            .await?;

        // `None` marks the end of the body so a partial line can be detected.
        let stream = response
            .bytes_stream()
            .map(|chunk_result| {
                Some(chunk_result.map_err(|e| ProviderError::network(format!("Stream error: {}", e))))
            })
            .chain(stream::once(futures::future::ready(None)))
            .scan(SseLineBuffer::default(), |buffer, chunk_result| {
                let items: Vec<Result<StreamChunk, ProviderError>> = match chunk_result {
                    Some(Ok(bytes)) => buffer
                        .push(&bytes)
                        .into_iter()
                        .filter_map(|line| parse_sse_line(&line))
                        .collect(),
                    Some(Err(e)) => vec![Err(e)],
                    None if buffer.has_partial_line() => {
                        vec![Err(ProviderError::network("stream ended mid-event"))]
                    }
                    None => Vec::new(),
                };
                futures::future::ready(Some(items))
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Reassembles SSE lines across network chunk boundaries.
#[derive(Debug, Default)]
struct SseLineBuffer {
    pending: Vec<u8>,
}

impl SseLineBuffer {
    /// Appends bytes and returns every line completed by them.
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..pos]);
            lines.push(text.trim_end_matches('\r').to_string());
        }
        lines
    }

    /// True if bytes other than whitespace are waiting for a newline.
    fn has_partial_line(&self) -> bool {
        self.pending.iter().any(|b| !b.is_ascii_whitespace())
    }
}

/// Parses one SSE line. Non-data lines (comments, blank separators) yield nothing.
fn parse_sse_line(line: &str) -> Option<Result<StreamChunk, ProviderError>> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() {
        return None;
    }

    match serde_json::from_str::<GenerateContentResponse>(data) {
        Ok(GenerateContentResponse {
            error: Some(error), ..
        }) => Some(Err(ProviderError::unavailable(error.message))),
        Ok(response) => Some(Ok(response.into_chunk())),
        Err(e) => Some(Err(ProviderError::parse(format!(
            "Failed to parse SSE chunk: {}",
            e
        )))),
    }
}

fn map_finish_reason(reason: &str) -> FinishReason {
    match reason {
        "STOP" => FinishReason::Stop,
        "MAX_TOKENS" => FinishReason::Length,
        "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "SPII" => {
            FinishReason::ContentFilter
        }
        _ => FinishReason::Other,
    }
}

// ----- Gemini API Types -----

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    generation_config: GenerationConfig,
}

impl From<&CompletionRequest> for GenerateContentRequest {
    fn from(request: &CompletionRequest) -> Self {
        let mut contents: Vec<Content> = request.history.iter().map(Content::from).collect();
        contents.push(Content::text(ProviderRole::User, &request.current));

        Self {
            contents,
            system_instruction: request.system_instruction.as_ref().map(|text| {
                SystemInstruction {
                    parts: vec![Part::text(text)],
                }
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                thinking_config: request
                    .thinking_budget
                    .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<ProviderRole>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn text(role: ProviderRole, text: &str) -> Self {
        Self {
            role: Some(role),
            parts: vec![Part::text(text)],
        }
    }
}

impl From<&ProviderMessage> for Content {
    fn from(message: &ProviderMessage) -> Self {
        Content::text(message.role, &message.text)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought: Option<bool>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            thought: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    model_version: Option<String>,
    /// Present when the API reports a failure in a success-status body.
    error: Option<ErrorDetail>,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|candidate| candidate.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter(|part| part.thought != Some(true))
                    .filter_map(|part| part.text.as_deref())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn finish_reason(&self) -> Option<FinishReason> {
        self.candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
            .map(map_finish_reason)
    }

    fn into_completion(self, requested_model: &str) -> CompletionResponse {
        CompletionResponse {
            content: self.text(),
            finish_reason: self.finish_reason(),
            usage: self.usage_metadata.as_ref().map(|u| {
                TokenUsage::new(u.prompt_token_count, u.candidates_token_count)
            }),
            model: self
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
        }
    }

    fn into_chunk(self) -> StreamChunk {
        StreamChunk {
            delta: self.text(),
            finish_reason: self.finish_reason(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: String,
}
