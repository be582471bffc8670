//! Request and response payloads of the JSON API.

use crate::model::chat::ChatMessage;
use crate::model::course::{CourseDocument, CourseForm, CourseOutline, SessionStage};
use serde::{Deserialize, Serialize};

/// Request payload for `POST /api/course/outline`.
/// Without a `session_id` a new session is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub form: CourseForm,
    /// Model to use for this session; the configured default otherwise.
    #[serde(default)]
    pub model: Option<String>,
}

/// Request payload for `POST /api/course/outline/edit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditOutlineRequest {
    pub session_id: String,
    pub instructions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlineResponse {
    pub session_id: String,
    pub outline: String,
}

/// Request payload for `POST /api/course/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteCourseRequest {
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStarted {
    pub job_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetModelRequest {
    pub model: String,
}

/// What the page needs to redraw a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub model: String,
    pub stage: SessionStage,
    pub form: Option<CourseForm>,
    /// Detailed request the outline was designed from.
    pub refined_prompt: Option<String>,
    pub outline: Option<String>,
    /// Modules and lessons the course was generated from.
    pub outline_structure: Option<CourseOutline>,
    pub document: Option<CourseDocument>,
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub content: String,
}

/// Request payload for `POST /api/content/pdf`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPdfRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedResource {
    pub id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Request payload for `POST /api/media/image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenerationRequest {
    pub prompt: String,
    #[serde(default)]
    pub style: String,
}

/// Request payload for `POST /api/media/speech`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "zh".to_string()
}

/// A media file written to the resource directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaFile {
    pub file_name: String,
    pub file_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
}
