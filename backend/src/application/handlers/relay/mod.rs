//! Relay handlers.
//!
//! One handler per relay operation, each issuing a single model call
//! through the completion gateway.

mod chat;
mod generate;
mod select_template;

pub use chat::{ChatCommand, ChatError, ChatHandler};
pub use generate::{GenerateCommand, GenerateHandler};
pub use select_template::{
    SelectTemplateCommand, SelectTemplateError, SelectTemplateHandler, TemplateSelection,
};
