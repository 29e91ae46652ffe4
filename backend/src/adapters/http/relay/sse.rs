//! Server-Sent Events framing for completion streams.
//!
//! Each [`CompletionEvent`] becomes one `data:` line:
//!
//! ```text
//! data: {"content":"Hel"}
//! data: {"content":"lo"}
//! data: {"done":true}
//! ```
//!
//! A failure becomes `data: {"error":"Internal server error"}` and the
//! stream closes; `done` never follows an error. Provider detail stays in
//! the logs.

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{self, BoxStream, StreamExt};
use std::convert::Infallible;

use super::dto::{StreamPayload, INTERNAL_ERROR_MESSAGE};
use crate::application::gateway::{CompletionEvent, CompletionEventStream};

/// SSE body stream.
pub type EventStream = BoxStream<'static, Result<Event, Infallible>>;

/// Frames a completion event stream.
///
/// Pulls one event from the gateway per SSE event; dropping the body drops
/// the gateway stream.
pub fn completion_events(events: CompletionEventStream) -> EventStream {
    events
        .map(|event| Ok(to_event(&payload_for(event))))
        .boxed()
}

/// A stream carrying a single error event.
pub fn error_event(message: impl Into<String>) -> EventStream {
    let event = to_event(&StreamPayload::error(message));
    stream::once(async move { Ok(event) }).boxed()
}

/// Wraps an event stream as an SSE response.
pub fn into_sse(events: EventStream) -> Sse<EventStream> {
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn payload_for(event: CompletionEvent) -> StreamPayload {
    match event {
        CompletionEvent::Fragment(text) => StreamPayload::content(text),
        CompletionEvent::End => StreamPayload::done(),
        CompletionEvent::Error(_) => StreamPayload::error(INTERNAL_ERROR_MESSAGE),
    }
}

fn to_event(payload: &StreamPayload) -> Event {
    Event::default().json_data(payload).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Failed to serialize stream payload");
        Event::default().data(r#"{"error":"Internal server error"}"#)
    })
}
