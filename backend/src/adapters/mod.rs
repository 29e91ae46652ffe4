//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Completion providers (Gemini, mock)
//! - `http` - Axum routes for the relay endpoints
//! - `prompts` - Prompt catalog sources

pub mod ai;
pub mod http;
pub mod prompts;
