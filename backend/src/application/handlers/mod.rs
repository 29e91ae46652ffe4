//! Application handlers.
//!
//! Command handlers that orchestrate the relay operations.

pub mod relay;

pub use relay::{
    ChatCommand, ChatError, ChatHandler, GenerateCommand, GenerateHandler, SelectTemplateCommand,
    SelectTemplateError, SelectTemplateHandler, TemplateSelection,
};
