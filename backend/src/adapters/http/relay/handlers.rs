//! HTTP handlers for the relay endpoints.
//!
//! These handlers connect Axum routes to the relay command handlers and map
//! their errors onto the public response shapes. Provider detail is logged,
//! never returned.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::gateway::CompletionGateway;
use crate::application::handlers::relay::{
    ChatCommand, ChatError, ChatHandler, GenerateCommand, GenerateHandler, SelectTemplateCommand,
    SelectTemplateError, SelectTemplateHandler,
};
use crate::ports::{CompletionProvider, PromptCatalog};

use super::dto::{
    ChatRequest, ErrorResponse, GenerateRequest, HealthResponse, ReplyResponse, TemplateRequest,
    TemplateResponse, INVALID_BODY_MESSAGE,
};
use super::sse::{completion_events, error_event, into_sse};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a body rejection to the public 400 shape; serde detail is logged only.
fn invalid_body(rejection: JsonRejection) -> ApiError {
    tracing::warn!(error = %rejection.body_text(), "Rejected request body");
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::invalid_body()))
}

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Per-endpoint call settings.
#[derive(Debug, Clone, PartialEq)]
pub struct RelaySettings {
    pub model: String,
    pub thinking_budget: Option<u32>,
    pub chat_temperature: f32,
    pub template_temperature: f32,
    pub generate_temperature: f32,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            thinking_budget: Some(0),
            chat_temperature: 0.7,
            template_temperature: 0.1,
            generate_temperature: 0.7,
        }
    }
}

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct RelayAppState {
    pub provider: Arc<dyn CompletionProvider>,
    pub prompts: Arc<dyn PromptCatalog>,
    pub settings: RelaySettings,
}

impl RelayAppState {
    pub fn new(
        provider: Arc<dyn CompletionProvider>,
        prompts: Arc<dyn PromptCatalog>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            provider,
            prompts,
            settings,
        }
    }

    fn gateway(&self) -> CompletionGateway<dyn CompletionProvider> {
        let gateway = CompletionGateway::new(self.provider.clone(), self.settings.model.clone());
        match self.settings.thinking_budget {
            Some(budget) => gateway.with_thinking_budget(budget),
            None => gateway,
        }
    }

    pub fn chat_handler(&self) -> ChatHandler<dyn CompletionProvider> {
        ChatHandler::new(
            self.gateway(),
            self.prompts.clone(),
            self.settings.chat_temperature,
        )
    }

    pub fn generate_handler(&self) -> GenerateHandler<dyn CompletionProvider> {
        GenerateHandler::new(self.gateway(), self.settings.generate_temperature)
    }

    pub fn select_template_handler(&self) -> SelectTemplateHandler<dyn CompletionProvider> {
        SelectTemplateHandler::new(
            self.gateway(),
            self.prompts.clone(),
            self.settings.template_temperature,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Relay a conversation and return the full reply
///
/// POST /chat
pub async fn chat(
    State(app_state): State<RelayAppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ReplyResponse>, ApiError> {
    let Json(req) = body.map_err(invalid_body)?;
    let response = app_state
        .chat_handler()
        .handle(ChatCommand {
            messages: req.messages,
        })
        .await
        .map_err(|e| match e {
            ChatError::InvalidInput(err) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(err.to_string())),
            ),
            ChatError::Gateway(err) => {
                tracing::error!(error = %err, "Chat relay failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal()))
            }
        })?;

    Ok(Json(ReplyResponse { response }))
}

/// Relay a conversation as Server-Sent Events
///
/// POST /chat/stream
pub async fn chat_stream(
    State(app_state): State<RelayAppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> impl IntoResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Rejected chat stream body");
            return into_sse(error_event(INVALID_BODY_MESSAGE));
        }
    };

    let events = match app_state.chat_handler().handle_stream(ChatCommand {
        messages: req.messages,
    }) {
        Ok(events) => completion_events(events),
        Err(e) => {
            tracing::warn!(error = %e, "Rejected chat stream request");
            error_event(e.to_string())
        }
    };

    into_sse(events)
}

/// One-shot generation, optionally streamed
///
/// POST /generate
pub async fn generate(
    State(app_state): State<RelayAppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return invalid_body(rejection).into_response(),
    };
    let handler = app_state.generate_handler();
    let cmd = GenerateCommand { prompt: req.prompt };

    if req.stream {
        return into_sse(completion_events(handler.handle_stream(cmd))).into_response();
    }

    match handler.handle(cmd).await {
        Ok(response) => Json(ReplyResponse { response }).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "Generation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal())).into_response()
        }
    }
}

/// Classify a project prompt and return its starter prompts
///
/// POST /template
pub async fn select_template(
    State(app_state): State<RelayAppState>,
    body: Result<Json<TemplateRequest>, JsonRejection>,
) -> Result<Json<TemplateResponse>, ApiError> {
    let Json(req) = body.map_err(invalid_body)?;
    let selection = app_state
        .select_template_handler()
        .handle(SelectTemplateCommand { prompt: req.prompt })
        .await
        .map_err(|e| match e {
            SelectTemplateError::UnrecognizedTemplate(_) => {
                (StatusCode::FORBIDDEN, Json(ErrorResponse::forbidden()))
            }
            SelectTemplateError::Gateway(err) => {
                tracing::error!(error = %err, "Template selection failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::internal()))
            }
        })?;

    Ok(Json(TemplateResponse {
        prompts: selection.prompts,
        ui_prompts: selection.ui_prompts,
    }))
}

/// Liveness probe
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
