//! Mock completion provider for testing.
//!
//! Provides a configurable mock implementation of the CompletionProvider
//! port, allowing tests to run without calling a real model API.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Scripted stream fragments, optionally followed by a mid-stream failure
//! - Simulated delays for timeout testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockCompletionProvider::new()
//!     .with_fragments(["Hel", "lo"])
//!     .with_delay(Duration::from_millis(100));
//!
//! let stream = provider.stream_complete(request).await?;
//! ```

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{
    ChunkStream, CompletionProvider, CompletionRequest, CompletionResponse, FinishReason,
    ProviderError, StreamChunk,
};

const MOCK_MODEL: &str = "mock-model-1";

/// Mock completion provider for testing.
///
/// Clones share the response queue and call history.
#[derive(Debug, Clone)]
pub struct MockCompletionProvider {
    /// Pre-configured responses (consumed in order).
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Complete text. Streamed as a single fragment.
    Success { content: String },
    /// Stream fragments, optionally failing after the last one.
    /// A single completion returns the concatenation (or the failure).
    Fragments {
        fragments: Vec<String>,
        then: Option<MockError>,
    },
    /// Fail before any output.
    Error(MockError),
}

/// Mock error types for testing error handling.
#[derive(Debug, Clone)]
pub enum MockError {
    /// Simulate rate limiting.
    RateLimited { message: String },
    /// Simulate provider unavailable.
    Unavailable { message: String },
    /// Simulate authentication failure.
    AuthenticationFailed,
    /// Simulate network error.
    Network { message: String },
    /// Simulate timeout.
    Timeout { timeout_secs: u64 },
}

impl From<MockError> for ProviderError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { message } => ProviderError::RateLimited(message),
            MockError::Unavailable { message } => ProviderError::unavailable(message),
            MockError::AuthenticationFailed => ProviderError::AuthenticationFailed,
            MockError::Network { message } => ProviderError::network(message),
            MockError::Timeout { timeout_secs } => ProviderError::Timeout { timeout_secs },
        }
    }
}

impl Default for MockCompletionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockCompletionProvider {
    /// Creates a new mock provider with default settings.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn push(self, response: MockResponse) -> Self {
        self.responses.lock().unwrap().push_back(response);
        self
    }

    /// Adds a successful response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.push(MockResponse::Success {
            content: content.into(),
        })
    }

    /// Adds a scripted stream to the queue.
    pub fn with_fragments<I, S>(self, fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Fragments {
            fragments: fragments.into_iter().map(Into::into).collect(),
            then: None,
        })
    }

    /// Adds a scripted stream that fails after its fragments.
    pub fn with_fragments_then_error<I, S>(self, fragments: I, error: MockError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(MockResponse::Fragments {
            fragments: fragments.into_iter().map(Into::into).collect(),
            then: Some(error),
        })
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: MockError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this provider.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Returns all recorded calls.
    pub fn get_calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Clears the call history.
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Records a call and returns the next response or a default.
    async fn record(&self, request: CompletionRequest) -> MockResponse {
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MockResponse::Success {
                content: "Mock response".to_string(),
            })
    }
}

#[async_trait]
impl CompletionProvider for MockCompletionProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        match self.record(request).await {
            MockResponse::Success { content } => {
                let mut response = CompletionResponse::text(content, MOCK_MODEL);
                response.finish_reason = Some(FinishReason::Stop);
                Ok(response)
            }
            MockResponse::Fragments {
                then: Some(err), ..
            } => Err(err.into()),
            MockResponse::Fragments {
                fragments,
                then: None,
            } => Ok(CompletionResponse::text(fragments.concat(), MOCK_MODEL)),
            MockResponse::Error(err) => Err(err.into()),
        }
    }

    async fn stream_complete(
        &self,
        request: CompletionRequest,
    ) -> Result<ChunkStream, ProviderError> {
        let (fragments, then) = match self.record(request).await {
            MockResponse::Success { content } => (vec![content], None),
            MockResponse::Fragments { fragments, then } => (fragments, then),
            MockResponse::Error(err) => return Err(err.into()),
        };

        let delay = self.delay;
        let chunks = stream::iter(fragments).then(move |fragment| async move {
            if !delay.is_zero() {
                sleep(delay / 10).await;
            }
            Ok::<_, ProviderError>(StreamChunk::content(fragment))
        });
        let failure = stream::iter(then.map(|err| Err::<StreamChunk, _>(err.into())));

        Ok(Box::pin(chunks.chain(failure)))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
