//! SelectTemplateHandler - Classify a project prompt into a starter template.
//!
//! The model is asked for a single word. The answer picks the prompt set
//! handed back to the caller:
//!
//! | Answer  | `prompts`                          | `ui_prompts` |
//! |---------|------------------------------------|--------------|
//! | `react` | base prompt, react artifact        | react        |
//! | `node`  | node artifact                      | node         |
//! | other   | error                              |              |

use std::sync::Arc;
use thiserror::Error;

use crate::application::gateway::{CompletionGateway, GatewayError};
use crate::domain::conversation::ConversationTurn;
use crate::domain::template::{artifact_prompt, ProjectTemplate};
use crate::ports::{CompletionProvider, PromptCatalog};

/// Command to classify a project prompt.
#[derive(Debug, Clone)]
pub struct SelectTemplateCommand {
    pub prompt: String,
}

/// Prompts selected for a classified project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSelection {
    pub template: ProjectTemplate,
    /// Prompts to seed the model conversation with.
    pub prompts: Vec<String>,
    /// Starter prompts for the client to render.
    pub ui_prompts: Vec<String>,
}

/// Error type for template selection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SelectTemplateError {
    /// The classifier answered with something other than a known template.
    #[error("unrecognized template: {0:?}")]
    UnrecognizedTemplate(String),

    /// The model call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Handler for template selection.
pub struct SelectTemplateHandler<P: ?Sized + CompletionProvider> {
    gateway: CompletionGateway<P>,
    prompts: Arc<dyn PromptCatalog>,
    temperature: f32,
}

impl<P: ?Sized + CompletionProvider> SelectTemplateHandler<P> {
    pub fn new(
        gateway: CompletionGateway<P>,
        prompts: Arc<dyn PromptCatalog>,
        temperature: f32,
    ) -> Self {
        Self {
            gateway,
            prompts,
            temperature,
        }
    }

    pub async fn handle(
        &self,
        cmd: SelectTemplateCommand,
    ) -> Result<TemplateSelection, SelectTemplateError> {
        let answer = self
            .gateway
            .complete_once(
                ConversationTurn::single(cmd.prompt),
                Some(self.prompts.classifier_instruction()),
                self.temperature,
            )
            .await?;

        let template = ProjectTemplate::from_classifier_answer(&answer).ok_or_else(|| {
            tracing::warn!(answer = %answer, "Classifier returned an unknown template");
            SelectTemplateError::UnrecognizedTemplate(answer.clone())
        })?;

        tracing::info!(template = %template, "Project template selected");
        Ok(self.selection(template))
    }

    fn selection(&self, template: ProjectTemplate) -> TemplateSelection {
        let starter = self.prompts.template_prompt(template);
        let artifact = artifact_prompt(starter);

        let prompts = match template {
            ProjectTemplate::React => vec![self.prompts.base_prompt().to_string(), artifact],
            ProjectTemplate::Node => vec![artifact],
        };

        TemplateSelection {
            template,
            prompts,
            ui_prompts: vec![starter.to_string()],
        }
    }
}
