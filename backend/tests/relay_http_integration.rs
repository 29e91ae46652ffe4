//! Integration tests for the relay HTTP endpoints.
//!
//! These tests drive the full router (middleware included) with a mock
//! provider and verify:
//! 1. JSON endpoints return the documented bodies and status codes
//! 2. SSE endpoints emit content, done and error events in order
//! 3. Invalid input never reaches the provider
//! 4. Dropping a streaming response releases the provider stream

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::stream::{self, StreamExt};
use serde_json::{json, Value};
use tower::ServiceExt;

use chat_relay::adapters::ai::{MockCompletionProvider, MockError};
use chat_relay::adapters::http::{relay_app, RelayAppState, RelaySettings};
use chat_relay::adapters::prompts::StaticPromptCatalog;
use chat_relay::domain::conversation::ProviderRole;
use chat_relay::domain::template::{artifact_prompt, ProjectTemplate};
use chat_relay::ports::{
    ChunkStream, CompletionProvider, CompletionRequest, CompletionResponse, PromptCatalog,
    ProviderError, StreamChunk,
};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn prompts() -> StaticPromptCatalog {
    StaticPromptCatalog::default()
        .with_system_prompt("SYSTEM")
        .with_template_prompt(ProjectTemplate::React, "REACT")
        .with_template_prompt(ProjectTemplate::Node, "NODE")
}

fn app_with(provider: Arc<dyn CompletionProvider>) -> Router {
    let state = RelayAppState::new(provider, Arc::new(prompts()), RelaySettings::default());
    relay_app(state, &[], Duration::from_secs(5))
}

fn app(provider: &MockCompletionProvider) -> Router {
    app_with(Arc::new(provider.clone()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn send_json(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// Parses the JSON payload of every `data:` line of an SSE body.
fn sse_payloads(body: &str) -> Vec<Value> {
    body.lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| serde_json::from_str(data.trim()).unwrap())
        .collect()
}

fn user_messages(text: &str) -> Value {
    json!({"messages": [{"role": "user", "content": text}]})
}

// =============================================================================
// POST /chat
// =============================================================================

#[tokio::test]
async fn chat_returns_full_reply() {
    let provider = MockCompletionProvider::new().with_response("Here you go");

    let (status, body) = send_json(app(&provider), post_json("/chat", user_messages("Hi"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "Here you go"}));
}

#[tokio::test]
async fn chat_relays_history_and_system_prompt() {
    let provider = MockCompletionProvider::new().with_response("ok");
    let body = json!({"messages": [
        {"role": "user", "content": "Build a blog"},
        {"role": "system", "content": "ignored"},
        {"role": "assistant", "content": "Done"},
        {"role": "user", "content": "Add comments"}
    ]});

    let (status, _) = send_json(app(&provider), post_json("/chat", body)).await;

    assert_eq!(status, StatusCode::OK);
    let request = &provider.get_calls()[0];
    assert_eq!(request.system_instruction.as_deref(), Some("SYSTEM"));
    assert_eq!(request.temperature, 0.7);
    assert_eq!(request.thinking_budget, Some(0));
    assert_eq!(request.history.len(), 2);
    assert_eq!(request.history[0].text, "Build a blog");
    assert_eq!(request.history[1].role, ProviderRole::Model);
    assert_eq!(request.current, "Add comments");
}

#[tokio::test]
async fn chat_rejects_empty_messages_without_provider_call() {
    let provider = MockCompletionProvider::new();

    let (status, body) =
        send_json(app(&provider), post_json("/chat", json!({"messages": []}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "No valid messages provided"}));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn chat_rejects_only_unrecognized_roles() {
    let provider = MockCompletionProvider::new();
    let body = json!({"messages": [{"role": "system", "content": "x"}]});

    let (status, _) = send_json(app(&provider), post_json("/chat", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn chat_hides_provider_failure_detail() {
    let provider = MockCompletionProvider::new().with_error(MockError::Unavailable {
        message: "backend pool exhausted".to_string(),
    });

    let (status, body) = send_json(app(&provider), post_json("/chat", user_messages("Hi"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Internal server error"}));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn chat_returns_empty_reply() {
    let provider = MockCompletionProvider::new().with_response("");

    let (status, body) = send_json(app(&provider), post_json("/chat", user_messages("Hi"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": ""}));
}

#[tokio::test]
async fn chat_is_deterministic_with_deterministic_provider() {
    let provider = MockCompletionProvider::new()
        .with_response("same")
        .with_response("same");

    let first = send_json(app(&provider), post_json("/chat", user_messages("Hi"))).await;
    let second = send_json(app(&provider), post_json("/chat", user_messages("Hi"))).await;

    assert_eq!(first, second);
}

// =============================================================================
// POST /chat/stream
// =============================================================================

#[tokio::test]
async fn chat_stream_emits_content_then_done() {
    let provider = MockCompletionProvider::new().with_fragments(["Hel", "lo"]);

    let response = app(&provider)
        .oneshot(post_json("/chat/stream", user_messages("Hi")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let payloads = sse_payloads(std::str::from_utf8(&bytes).unwrap());

    assert_eq!(
        payloads,
        vec![
            json!({"content": "Hel"}),
            json!({"content": "lo"}),
            json!({"done": true}),
        ]
    );
}

#[tokio::test]
async fn chat_stream_failure_after_fragment_emits_error_without_done() {
    let provider = MockCompletionProvider::new().with_fragments_then_error(
        ["Hel"],
        MockError::Network {
            message: "connection reset".to_string(),
        },
    );

    let (status, body) = send(app(&provider), post_json("/chat/stream", user_messages("Hi"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sse_payloads(&body),
        vec![
            json!({"content": "Hel"}),
            json!({"error": "Internal server error"}),
        ]
    );
}

#[tokio::test]
async fn chat_stream_failure_before_output_emits_single_error() {
    let provider = MockCompletionProvider::new().with_error(MockError::AuthenticationFailed);

    let (_, body) = send(app(&provider), post_json("/chat/stream", user_messages("Hi"))).await;

    assert_eq!(
        sse_payloads(&body),
        vec![json!({"error": "Internal server error"})]
    );
}

#[tokio::test]
async fn chat_stream_rejects_empty_messages_in_band() {
    let provider = MockCompletionProvider::new();

    let (status, body) = send(
        app(&provider),
        post_json("/chat/stream", json!({"messages": []})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sse_payloads(&body),
        vec![json!({"error": "No valid messages provided"})]
    );
    assert_eq!(provider.call_count(), 0);
}

/// Provider whose stream never ends and reports when it is dropped.
struct EndlessProvider {
    dropped: Arc<AtomicBool>,
}

struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl CompletionProvider for EndlessProvider {
    async fn complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::unavailable("stream only"))
    }

    async fn stream_complete(
        &self,
        _request: CompletionRequest,
    ) -> Result<ChunkStream, ProviderError> {
        let flag = DropFlag(self.dropped.clone());
        let chunks = stream::repeat(()).then(move |_| {
            let _held = &flag;
            async {
                tokio::task::yield_now().await;
                Ok::<_, ProviderError>(StreamChunk::content("tick"))
            }
        });
        Ok(Box::pin(chunks))
    }

    fn name(&self) -> &str {
        "endless"
    }
}

#[tokio::test]
async fn dropping_stream_response_releases_provider_stream() {
    let dropped = Arc::new(AtomicBool::new(false));
    let app = app_with(Arc::new(EndlessProvider {
        dropped: dropped.clone(),
    }));

    let response = app
        .oneshot(post_json("/chat/stream", user_messages("Hi")))
        .await
        .unwrap();
    let mut body = response.into_body().into_data_stream();

    let first = body.next().await.unwrap().unwrap();
    assert!(std::str::from_utf8(&first).unwrap().contains("tick"));
    assert!(!dropped.load(Ordering::SeqCst));

    drop(body);
    assert!(dropped.load(Ordering::SeqCst));
}

// =============================================================================
// POST /generate
// =============================================================================

#[tokio::test]
async fn generate_returns_full_reply_by_default() {
    let provider = MockCompletionProvider::new().with_response("A poem");

    let (status, body) = send_json(
        app(&provider),
        post_json("/generate", json!({"prompt": "Write a poem"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "A poem"}));
    let request = &provider.get_calls()[0];
    assert!(request.system_instruction.is_none());
    assert!(request.history.is_empty());
    assert_eq!(request.current, "Write a poem");
}

#[tokio::test]
async fn generate_streams_when_requested() {
    let provider = MockCompletionProvider::new().with_fragments(["A ", "poem"]);

    let (status, body) = send(
        app(&provider),
        post_json("/generate", json!({"prompt": "Write a poem", "stream": true})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sse_payloads(&body),
        vec![
            json!({"content": "A "}),
            json!({"content": "poem"}),
            json!({"done": true}),
        ]
    );
}

#[tokio::test]
async fn generate_failure_is_internal_error() {
    let provider = MockCompletionProvider::new().with_error(MockError::Timeout { timeout_secs: 120 });

    let (status, body) = send_json(
        app(&provider),
        post_json("/generate", json!({"prompt": "Write a poem"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Internal server error"}));
}

// =============================================================================
// POST /template
// =============================================================================

#[tokio::test]
async fn template_react_returns_base_and_react_prompts() {
    let provider = MockCompletionProvider::new().with_response("React");

    let (status, body) = send_json(
        app(&provider),
        post_json("/template", json!({"prompt": "A todo app"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "prompts": [prompts().base_prompt(), artifact_prompt("REACT")],
            "uiPrompts": ["REACT"]
        })
    );
    let request = &provider.get_calls()[0];
    assert_eq!(request.temperature, 0.1);
    assert_eq!(
        request.system_instruction.as_deref(),
        Some(prompts().classifier_instruction())
    );
}

#[tokio::test]
async fn template_node_returns_node_prompt() {
    let provider = MockCompletionProvider::new().with_response("node\n");

    let (status, body) = send_json(
        app(&provider),
        post_json("/template", json!({"prompt": "A REST API"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"prompts": [artifact_prompt("NODE")], "uiPrompts": ["NODE"]})
    );
}

#[tokio::test]
async fn template_unknown_answer_is_forbidden() {
    let provider = MockCompletionProvider::new().with_response("svelte");

    let (status, body) = send_json(
        app(&provider),
        post_json("/template", json!({"prompt": "A site"})),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "You cant access this"}));
}

#[tokio::test]
async fn template_provider_failure_is_internal_error() {
    let provider = MockCompletionProvider::new().with_error(MockError::RateLimited {
        message: "quota".to_string(),
    });

    let (status, body) = send_json(
        app(&provider),
        post_json("/template", json!({"prompt": "A site"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Internal server error"}));
}

// =============================================================================
// GET /health
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let provider = MockCompletionProvider::new();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = send_json(app(&provider), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    assert_eq!(provider.call_count(), 0);
}

// =============================================================================
// Malformed request bodies
// =============================================================================

fn post_raw(uri: &str, content_type: &str, body: &'static str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn chat_stream_drops_message_without_content() {
    let provider = MockCompletionProvider::new().with_fragments(["ok"]);
    let body = json!({"messages": [
        {"role": "system"},
        {"role": "user", "content": "hi"}
    ]});

    let (status, body) = send(app(&provider), post_json("/chat/stream", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        sse_payloads(&body),
        vec![json!({"content": "ok"}), json!({"done": true})]
    );
    assert_eq!(provider.call_count(), 1);
    assert!(provider.get_calls()[0].history.is_empty());
}

#[tokio::test]
async fn chat_drops_message_with_non_string_role() {
    let provider = MockCompletionProvider::new().with_response("ok");
    let body = json!({"messages": [
        {"role": null, "content": "x"},
        {"role": 3, "content": "y"},
        {"role": "user", "content": "hi"}
    ]});

    let (status, body) = send_json(app(&provider), post_json("/chat", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"response": "ok"}));
    let request = &provider.get_calls()[0];
    assert!(request.history.is_empty());
    assert_eq!(request.current, "hi");
}

#[tokio::test]
async fn json_routes_answer_unparseable_bodies_with_error_response() {
    let provider = MockCompletionProvider::new();

    for uri in ["/chat", "/generate", "/template"] {
        let response = app(&provider)
            .oneshot(post_raw(uri, "application/json", "not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json",
            "{}",
            uri
        );
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({"message": "Invalid request body"}), "{}", uri);
    }
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn json_routes_reject_wrong_shapes_and_content_types() {
    let provider = MockCompletionProvider::new();

    let (status, body) = send_json(
        app(&provider),
        post_json("/generate", json!({"prompt": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid request body"}));

    let (status, body) = send_json(
        app(&provider),
        post_raw("/template", "text/plain", r#"{"prompt":"a blog"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "Invalid request body"}));

    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn chat_stream_answers_unparseable_body_in_band() {
    let provider = MockCompletionProvider::new();

    let response = app(&provider)
        .oneshot(post_raw("/chat/stream", "application/json", "not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/event-stream"
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        sse_payloads(std::str::from_utf8(&bytes).unwrap()),
        vec![json!({"error": "Invalid request body"})]
    );
    assert_eq!(provider.call_count(), 0);
}
