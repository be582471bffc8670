//! Persisted teaching resources and their audit trail.
//!
//! A [`Resource`] is any saved artifact: generated text (outlines, lessons,
//! exercises...) stored inline in `content`, or a media file (image, audio)
//! stored on disk and referenced by `file_path`.

use serde::{Deserialize, Serialize};

/// Type label of generated images.
pub const IMAGE_TYPE: &str = "图像";
/// Type label of synthesized audio.
pub const AUDIO_TYPE: &str = "音频";
/// Category used for media produced by the generators.
pub const AI_CATEGORY: &str = "AI生成";
/// Filter value meaning "do not filter".
pub const ALL_FILTER: &str = "所有";

pub const DEFAULT_QUALITY_SCORE: u8 = 5;

/// Whether a resource keeps its payload inline or as a file on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceKind {
    Text,
    Media,
}

impl ResourceKind {
    pub fn of(resource_type: &str) -> Self {
        match resource_type {
            IMAGE_TYPE | AUDIO_TYPE => ResourceKind::Media,
            _ => ResourceKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub category: String,
    pub content: Option<String>,
    pub file_path: Option<String>,
    pub created_at: String,
    pub tags: String,
    pub description: String,
    pub quality_score: u8,
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        ResourceKind::of(&self.resource_type)
    }
}

/// Payload of a save action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResource {
    pub title: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub category: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quality_score: Option<u8>,
}

impl NewResource {
    pub fn text(
        title: impl Into<String>,
        resource_type: impl Into<String>,
        category: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            resource_type: resource_type.into(),
            category: category.into(),
            content: Some(content.into()),
            file_path: None,
            tags: String::new(),
            description: String::new(),
            quality_score: None,
        }
    }

    pub fn media(
        title: impl Into<String>,
        resource_type: impl Into<String>,
        category: impl Into<String>,
        file_path: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            resource_type: resource_type.into(),
            category: category.into(),
            content: None,
            file_path: Some(file_path.into()),
            tags: String::new(),
            description: String::new(),
            quality_score: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }
}

/// Search and filter criteria for listing resources.
///
/// Empty strings and [`ALL_FILTER`] disable the corresponding filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "type")]
    pub resource_type: Option<String>,
}

impl ResourceQuery {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            search: Some(term.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub id: i64,
    pub action: String,
    pub resource_id: Option<i64>,
    pub timestamp: String,
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: i64,
    pub resource_id: i64,
    pub rating: u8,
    pub comment: String,
    pub timestamp: String,
}

/// Dashboard numbers over the resource library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceStats {
    pub total: i64,
    /// `(type, count)` pairs ordered by type.
    pub by_type: Vec<(String, i64)>,
    /// `(category, count)` pairs ordered by category.
    pub by_category: Vec<(String, i64)>,
    pub average_quality: f64,
    pub recent_logs: Vec<ActionLogEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_types_are_file_backed() {
        assert_eq!(ResourceKind::of(IMAGE_TYPE), ResourceKind::Media);
        assert_eq!(ResourceKind::of(AUDIO_TYPE), ResourceKind::Media);
        assert_eq!(ResourceKind::of("课程大纲"), ResourceKind::Text);
    }

    #[test]
    fn new_resource_uses_type_field_name() {
        let json = serde_json::to_value(NewResource::text("T", "练习题目", "数学", "body")).unwrap();
        assert_eq!(json["type"], "练习题目");
        assert!(json["file_path"].is_null());
    }
}
