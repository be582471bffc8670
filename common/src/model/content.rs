use serde::{Deserialize, Serialize};

/// Extra requirements appended to a content-type prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentOptions {
    /// Difficulty label, e.g. `基础` or `进阶`.
    #[serde(default)]
    pub difficulty: String,
    /// Writing style label, e.g. `专业严谨`.
    #[serde(default)]
    pub output_style: String,
    #[serde(default = "default_include_examples")]
    pub include_examples: bool,
}

fn default_include_examples() -> bool {
    true
}

impl Default for ContentOptions {
    fn default() -> Self {
        Self {
            difficulty: String::new(),
            output_style: String::new(),
            include_examples: true,
        }
    }
}

/// A single-shot generation request from the content page: one of the
/// known content types (outline, slides, exercises, case study, lab guide)
/// filled in with the user's topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    pub content_type: String,
    pub topic: String,
    pub subject: String,
    pub edu_level: String,
    #[serde(default)]
    pub options: ContentOptions,
    /// Overrides the configured default model when set.
    #[serde(default)]
    pub model: Option<String>,
}
