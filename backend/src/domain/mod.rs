//! Domain layer containing pure relay types.
//!
//! # Module Organization
//!
//! - `conversation` - Messages and the conversation adapter
//! - `template` - Project template labels produced by prompt classification

pub mod conversation;
pub mod template;
