//! Prompt Catalog Port - Source of static instructional text.
//!
//! The relay treats prompt text as opaque strings supplied by a catalog.

use crate::domain::template::ProjectTemplate;

/// Port for the prompt texts used by the relay endpoints.
pub trait PromptCatalog: Send + Sync {
    /// System instruction for conversational chat.
    fn system_prompt(&self) -> &str;

    /// Base prompt prepended to the prompts of some templates.
    fn base_prompt(&self) -> &str;

    /// System instruction for classifying a project prompt into a template.
    fn classifier_instruction(&self) -> &str;

    /// Starter prompt describing the files of a template.
    fn template_prompt(&self, template: ProjectTemplate) -> &str;
}
