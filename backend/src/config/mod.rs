//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `CHAT_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use chat_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {:?}", config.server.socket_addr());
//! ```

mod ai;
mod error;
mod generation;
mod prompts;
mod server;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use prompts::PromptsConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

use crate::adapters::http::RelaySettings;

/// Plain variable accepted for the API key when the prefixed one is unset.
const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment)
    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini provider configuration
    #[serde(default)]
    pub ai: AiConfig,

    /// Per-endpoint temperatures
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Prompt text source
    #[serde(default)]
    pub prompts: PromptsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Uses `GEMINI_API_KEY` as the default API key
    /// 3. Reads environment variables with `CHAT_RELAY` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    /// 5. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `CHAT_RELAY__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `CHAT_RELAY__AI__MODEL=gemini-2.5-pro` -> `ai.model = gemini-2.5-pro`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Ok(key) = std::env::var(GEMINI_API_KEY_VAR) {
            builder = builder.set_default("ai.gemini_api_key", key)?;
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("CHAT_RELAY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.ai.validate()?;
        self.generation.validate()?;

        // The route timeout must leave room for the provider's own timeout.
        if self.server.request_timeout_secs <= self.ai.timeout_secs {
            return Err(ValidationError::RequestTimeoutTooShort {
                request_secs: self.server.request_timeout_secs,
                provider_secs: self.ai.timeout_secs,
            });
        }
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }

    /// Call settings shared by the relay endpoints
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            model: self.ai.model.clone(),
            thinking_budget: Some(self.ai.thinking_budget),
            chat_temperature: self.generation.chat_temperature,
            template_temperature: self.generation.template_temperature,
            generate_temperature: self.generation.generate_temperature,
        }
    }
}
