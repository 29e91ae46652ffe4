//! Prompt catalog backed by in-memory strings.
//!
//! Every prompt has a built-in default. A directory can override any of
//! them with one markdown file per prompt:
//!
//! ```text
//! {dir}/system.md      chat system instruction
//! {dir}/base.md        base prompt for react projects
//! {dir}/classifier.md  template classifier instruction
//! {dir}/node.md        node starter files
//! {dir}/react.md       react starter files
//! ```
//!
//! Missing files fall back to the built-in text; unreadable files are errors.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::template::ProjectTemplate;
use crate::ports::PromptCatalog;

const DEFAULT_SYSTEM_PROMPT: &str = "You are an expert AI assistant and senior software developer. \
Help the user build web projects. Answer with complete, working file contents \
and keep explanations short.";

const DEFAULT_BASE_PROMPT: &str = "For all designs I ask you to make, have them be beautiful, not cookie cutter. \
Make webpages that are fully featured and worthy for production.";

const DEFAULT_CLASSIFIER_INSTRUCTION: &str = "Return either node or react based on what do you think this project should be. \
Only return a single word either 'node' or 'react'. Do not return anything extra";

const DEFAULT_NODE_PROMPT: &str = "<boltArtifact id=\"project-import\" title=\"Project Files\">\
<boltAction type=\"file\" filePath=\"index.js\">// run `node index.js` in the terminal\n\n\
console.log(`Hello Node.js v${process.versions.node}!`);\n</boltAction>\
<boltAction type=\"file\" filePath=\"package.json\">{\n  \"name\": \"node-starter\",\n  \
\"private\": true,\n  \"scripts\": {\n    \"test\": \"echo \\\"Error: no test specified\\\" && exit 1\"\n  }\n}\n\
</boltAction></boltArtifact>";

const DEFAULT_REACT_PROMPT: &str = "<boltArtifact id=\"project-import\" title=\"Project Files\">\
<boltAction type=\"file\" filePath=\"package.json\">{\n  \"name\": \"vite-react-typescript-starter\",\n  \
\"private\": true,\n  \"type\": \"module\",\n  \"scripts\": {\n    \"dev\": \"vite\",\n    \
\"build\": \"vite build\"\n  }\n}\n</boltAction>\
<boltAction type=\"file\" filePath=\"src/App.tsx\">function App() {\n  \
return <p>Start prompting to see magic happen :)</p>;\n}\n\nexport default App;\n</boltAction>\
</boltArtifact>";

/// Failure to read a prompt override.
#[derive(Debug, Error)]
#[error("failed to read prompt file {path}: {source}")]
pub struct PromptLoadError {
    path: PathBuf,
    #[source]
    source: io::Error,
}

/// Prompt catalog holding every text in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticPromptCatalog {
    system: String,
    base: String,
    classifier: String,
    node: String,
    react: String,
}

impl Default for StaticPromptCatalog {
    fn default() -> Self {
        Self {
            system: DEFAULT_SYSTEM_PROMPT.to_string(),
            base: DEFAULT_BASE_PROMPT.to_string(),
            classifier: DEFAULT_CLASSIFIER_INSTRUCTION.to_string(),
            node: DEFAULT_NODE_PROMPT.to_string(),
            react: DEFAULT_REACT_PROMPT.to_string(),
        }
    }
}

impl StaticPromptCatalog {
    /// Loads overrides from `dir`, keeping built-in text for missing files.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, PromptLoadError> {
        let dir = dir.as_ref();
        let defaults = Self::default();

        Ok(Self {
            system: read_or(dir, "system.md", defaults.system)?,
            base: read_or(dir, "base.md", defaults.base)?,
            classifier: read_or(dir, "classifier.md", defaults.classifier)?,
            node: read_or(dir, "node.md", defaults.node)?,
            react: read_or(dir, "react.md", defaults.react)?,
        })
    }

    /// Replaces the chat system prompt.
    pub fn with_system_prompt(mut self, text: impl Into<String>) -> Self {
        self.system = text.into();
        self
    }

    /// Replaces the starter prompt of one template.
    pub fn with_template_prompt(mut self, template: ProjectTemplate, text: impl Into<String>) -> Self {
        match template {
            ProjectTemplate::Node => self.node = text.into(),
            ProjectTemplate::React => self.react = text.into(),
        }
        self
    }
}

fn read_or(dir: &Path, file: &str, fallback: String) -> Result<String, PromptLoadError> {
    let path = dir.join(file);
    match std::fs::read_to_string(&path) {
        Ok(text) => {
            tracing::debug!(path = %path.display(), "Loaded prompt override");
            Ok(text)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(fallback),
        Err(source) => Err(PromptLoadError { path, source }),
    }
}

impl PromptCatalog for StaticPromptCatalog {
    fn system_prompt(&self) -> &str {
        &self.system
    }

    fn base_prompt(&self) -> &str {
        &self.base
    }

    fn classifier_instruction(&self) -> &str {
        &self.classifier
    }

    fn template_prompt(&self, template: ProjectTemplate) -> &str {
        match template {
            ProjectTemplate::Node => &self.node,
            ProjectTemplate::React => &self.react,
        }
    }
}
