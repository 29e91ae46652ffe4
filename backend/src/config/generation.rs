//! Per-endpoint generation settings

use serde::Deserialize;

use super::error::ValidationError;

/// Sampling temperatures for each relay operation
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GenerationConfig {
    /// Temperature for `/chat` and `/chat/stream`
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,

    /// Temperature for the `/template` classifier
    #[serde(default = "default_template_temperature")]
    pub template_temperature: f32,

    /// Temperature for `/generate`
    #[serde(default = "default_generate_temperature")]
    pub generate_temperature: f32,
}

impl GenerationConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_temperature("chat", self.chat_temperature)?;
        check_temperature("template", self.template_temperature)?;
        check_temperature("generate", self.generate_temperature)?;
        Ok(())
    }
}

fn check_temperature(name: &'static str, value: f32) -> Result<(), ValidationError> {
    if (0.0..=2.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::InvalidTemperature(name))
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            chat_temperature: default_chat_temperature(),
            template_temperature: default_template_temperature(),
            generate_temperature: default_generate_temperature(),
        }
    }
}

fn default_chat_temperature() -> f32 {
    0.7
}

fn default_template_temperature() -> f32 {
    0.1
}

fn default_generate_temperature() -> f32 {
    0.7
}
