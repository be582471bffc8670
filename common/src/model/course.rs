//! Course structures produced by the generation pipeline.
//!
//! A course is described by a [`CourseForm`], turned into a free-text outline
//! by the completion API, then into a [`CourseOutline`] (ordered modules, each
//! with ordered lessons), and finally into a [`CourseDocument`] holding the
//! generated lesson texts and one quiz per module.

use serde::{Deserialize, Serialize};

/// Form fields describing the course to generate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseForm {
    pub course_name: String,
    /// Target education level of the audience (e.g. `高中`, `本科`).
    pub edu_level: String,
    /// Difficulty label (e.g. `初级`, `中级`, `高级`).
    pub difficulty: String,
    #[serde(default = "default_num_modules")]
    pub num_modules: u8,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub credit: String,
}

fn default_num_modules() -> u8 {
    5
}

impl CourseForm {
    pub const MIN_MODULES: u8 = 1;
    pub const MAX_MODULES: u8 = 15;

    /// Human readable summary of the form, recorded in the session history.
    pub fn summary(&self) -> String {
        format!(
            "课程名称: {}\n教育水平: {}\n难度等级: {}\n模块数量: {}\n课程时长: {}\n课程学分: {}",
            self.course_name,
            self.edu_level,
            self.difficulty,
            self.num_modules,
            self.duration,
            self.credit
        )
    }
}

/// One module of a parsed outline and its lesson names, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleOutline {
    pub name: String,
    pub lessons: Vec<String>,
}

/// Module -> lessons mapping. Module order is the order the model returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseOutline {
    pub modules: Vec<ModuleOutline>,
}

impl CourseOutline {
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    pub fn module(&self, name: &str) -> Option<&ModuleOutline> {
        self.modules.iter().find(|m| m.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonContent {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleContent {
    pub name: String,
    pub lessons: Vec<LessonContent>,
    pub quiz: String,
}

impl ModuleContent {
    /// Lesson texts as they are fed to the quiz prompt, each followed by a
    /// blank line.
    pub fn lesson_text(&self) -> String {
        let mut text = String::new();
        for lesson in &self.lessons {
            text.push_str(&lesson.text);
            text.push_str("\n\n");
        }
        text
    }
}

/// The finished course: every processed module with its lessons and quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseDocument {
    pub course_name: String,
    pub modules: Vec<ModuleContent>,
}

impl CourseDocument {
    /// Flattened document text: per module, lesson text followed by the quiz.
    pub fn text(&self) -> String {
        self.modules
            .iter()
            .map(|m| format!("{}\n\n{}", m.lesson_text(), m.quiz))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }
}

/// Where a generation session currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStage {
    Idle,
    OutlineRequested,
    OutlineReady,
    Editing,
    Completing,
    Done,
    /// The last operation failed; carries the message shown to the user.
    Failed(String),
}
