//! Chat Relay - Streaming bridge between chat clients and a text-generation API
//!
//! This crate relays conversations and one-shot prompts to Google Gemini and
//! returns the reply either whole or as Server-Sent Events.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
