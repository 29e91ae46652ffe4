//! Project template labels.
//!
//! A project prompt is classified by the model into one of a fixed set of
//! starter templates. The classifier is instructed to answer with a single
//! word; anything else is treated as unrecognized.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Starter template a project prompt is classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectTemplate {
    Node,
    React,
}

impl ProjectTemplate {
    /// Parses a raw classifier answer.
    ///
    /// Surrounding whitespace and letter case are ignored; any other text
    /// (including extra words) yields `None`.
    pub fn from_classifier_answer(answer: &str) -> Option<Self> {
        match answer.trim().to_lowercase().as_str() {
            "node" => Some(Self::Node),
            "react" => Some(Self::React),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::React => "react",
        }
    }
}

impl fmt::Display for ProjectTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wraps a template's base prompt as the artifact shown to the model.
pub fn artifact_prompt(template_prompt: &str) -> String {
    format!(
        "Here is an artifact that contains all files of the project visible to you.\n\
         Consider the contents of ALL files in the project.\n\n\
         {template_prompt}\n\n\
         Here is a list of files that exist on the file system but are not being shown to you:\n\n  \
         - .gitignore\n  \
         - package-lock.json\n"
    )
}
