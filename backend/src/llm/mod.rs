//! Boundary to the hosted model provider.
//!
//! The pipeline only sees [`CompletionApi`]: an opaque request/response call
//! taking a model name and an ordered list of role/content messages and
//! returning one text completion. [`OpenAiClient`] implements it (and the
//! image and speech boundaries in `media`) against an OpenAI-compatible
//! HTTP API.

mod http;
mod openai;

pub use openai::OpenAiClient;

use crate::error::ProviderError;
use async_trait::async_trait;
use common::model::chat::ChatMessage;

#[async_trait]
pub trait CompletionApi: Send + Sync {
    /// Send `messages` to `model` and return the first completion's text.
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError>;

    /// Identifiers of the models the credentials can use. Also serves as the
    /// startup credential check.
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;
}
