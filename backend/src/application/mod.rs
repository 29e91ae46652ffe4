//! Application layer - Gateway and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! The completion gateway owns the model-call lifecycle; handlers map each
//! relay operation onto it.

pub mod gateway;
pub mod handlers;

pub use gateway::{CompletionEvent, CompletionEventStream, CompletionGateway, GatewayError};
