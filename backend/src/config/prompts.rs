//! Prompt source configuration

use serde::Deserialize;
use std::path::PathBuf;

use crate::adapters::prompts::{PromptLoadError, StaticPromptCatalog};

/// Where prompt text comes from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptsConfig {
    /// Directory of markdown overrides; built-in prompts when unset
    pub dir: Option<PathBuf>,
}

impl PromptsConfig {
    /// Build the prompt catalog
    pub fn catalog(&self) -> Result<StaticPromptCatalog, PromptLoadError> {
        match &self.dir {
            Some(dir) => StaticPromptCatalog::from_dir(dir),
            None => Ok(StaticPromptCatalog::default()),
        }
    }
}
