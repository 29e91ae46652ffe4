//! HTTP adapters - REST API implementations.
//!
//! [`relay_app`] assembles the relay router with the middleware stack used
//! in production: request ids, tracing, a response timeout and CORS.

pub mod relay;

pub use relay::{relay_router, RelayAppState, RelaySettings};

use axum::Router;
use http::HeaderValue;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the relay application with middleware.
///
/// The timeout bounds the time until response headers are sent; an SSE
/// body keeps streaming after that.
pub fn relay_app(state: RelayAppState, cors_origins: &[String], timeout: Duration) -> Router {
    relay_router().with_state(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(timeout))
            .layer(cors_layer(cors_origins)),
    )
}

/// CORS policy: any origin when none are configured.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods(Any)
        .allow_headers(Any)
}
