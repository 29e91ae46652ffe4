//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid provider timeout")]
    InvalidProviderTimeout,

    #[error("Request timeout ({request_secs}s) must exceed the provider timeout ({provider_secs}s)")]
    RequestTimeoutTooShort { request_secs: u64, provider_secs: u64 },

    #[error("Invalid provider base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Temperature for {0} must be between 0.0 and 2.0")]
    InvalidTemperature(&'static str),
}
