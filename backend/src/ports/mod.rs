//! Ports - Interfaces between the relay core and external collaborators.
//!
//! Ports define contracts that adapters implement:
//! - `CompletionProvider` - Remote text-generation service
//! - `PromptCatalog` - Static instructional text

mod completion_provider;
mod prompt_catalog;

pub use completion_provider::{
    ChunkStream, CompletionProvider, CompletionRequest, CompletionResponse, FinishReason,
    ProviderError, StreamChunk, TokenUsage,
};
pub use prompt_catalog::PromptCatalog;
