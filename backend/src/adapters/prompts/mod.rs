//! Prompt Catalog Adapters.
//!
//! - `StaticPromptCatalog` - Built-in prompt text, optionally overridden
//!   by markdown files in a directory

mod static_catalog;

pub use static_catalog::{PromptLoadError, StaticPromptCatalog};
