use super::http::check_response;
use super::CompletionApi;
use crate::config::LlmConfig;
use crate::error::{MediaError, ProviderError};
use crate::media::{ImageApi, ImageRequest, SpeechApi};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use common::model::chat::ChatMessage;
use log::debug;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for an OpenAI-compatible REST API.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    image_model: String,
    speech_model: String,
    transcription_model: String,
    voice: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Serialize)]
struct ImageGenerationBody<'a> {
    model: &'a str,
    prompt: &'a str,
    size: &'a str,
    quality: &'a str,
    n: u8,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
    b64_json: Option<String>,
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    response_format: &'a str,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl OpenAiClient {
    pub fn new(config: &LlmConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .user_agent("coursegen/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            image_model: config.image_model.clone(),
            speech_model: config.speech_model.clone(),
            transcription_model: config.transcription_model.clone(),
            voice: config.voice.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let resp = self.http.get(url).send().await.map_err(MediaError::Download)?;
        let resp = resp.error_for_status().map_err(MediaError::Download)?;
        let bytes = resp.bytes().await.map_err(MediaError::Download)?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CompletionApi for OpenAiClient {
    async fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        debug!(
            "completion request: model={}, messages={}, chars={}",
            model,
            messages.len(),
            messages.iter().map(|m| m.content.len()).sum::<usize>()
        );
        let resp = self
            .http
            .post(self.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&ChatRequest { model, messages })
            .send()
            .await?;
        let body: ChatResponse = check_response(resp).await?.json().await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ProviderError::EmptyResponse)
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let resp = self
            .http
            .get(self.url("models"))
            .bearer_auth(&self.api_key)
            .send()
            .await?;
        let list: ModelList = check_response(resp).await?.json().await?;
        Ok(list.data.into_iter().map(|m| m.id).collect())
    }
}

#[async_trait]
impl ImageApi for OpenAiClient {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, MediaError> {
        let resp = self
            .http
            .post(self.url("images/generations"))
            .bearer_auth(&self.api_key)
            .json(&ImageGenerationBody {
                model: &self.image_model,
                prompt: &request.prompt,
                size: &request.size,
                quality: &request.quality,
                n: request.count,
            })
            .send()
            .await
            .map_err(ProviderError::from)?;
        let body: ImageGenerationResponse = check_response(resp)
            .await?
            .json()
            .await
            .map_err(ProviderError::from)?;
        let image = body
            .data
            .into_iter()
            .next()
            .ok_or(ProviderError::EmptyResponse)?;

        match (image.b64_json, image.url) {
            (Some(b64), _) => Ok(BASE64.decode(b64)?),
            (None, Some(url)) => self.fetch_image(&url).await,
            (None, None) => Err(ProviderError::EmptyResponse.into()),
        }
    }
}

#[async_trait]
impl SpeechApi for OpenAiClient {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, MediaError> {
        debug!("speech synthesis: language={}, chars={}", language, text.len());
        let resp = self
            .http
            .post(self.url("audio/speech"))
            .bearer_auth(&self.api_key)
            .json(&SpeechBody {
                model: &self.speech_model,
                input: text,
                voice: &self.voice,
                response_format: "mp3",
            })
            .send()
            .await
            .map_err(ProviderError::from)?;
        let bytes = check_response(resp)
            .await?
            .bytes()
            .await
            .map_err(ProviderError::from)?;
        if bytes.is_empty() {
            return Err(ProviderError::EmptyResponse.into());
        }
        Ok(bytes.to_vec())
    }

    async fn transcribe(
        &self,
        file_name: &str,
        audio: Vec<u8>,
        language: &str,
    ) -> Result<String, MediaError> {
        let form = Form::new()
            .text("model", self.transcription_model.clone())
            .text("language", iso_language(language))
            .part("file", Part::bytes(audio).file_name(file_name.to_string()));
        let resp = self
            .http
            .post(self.url("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(ProviderError::from)?;
        let body: TranscriptionResponse = check_response(resp)
            .await?
            .json()
            .await
            .map_err(ProviderError::from)?;
        let text = body.text.trim().to_string();
        if text.is_empty() {
            return Err(MediaError::Unrecognized);
        }
        Ok(text)
    }
}

/// `zh-CN` -> `zh`; transcription takes ISO-639-1 codes.
fn iso_language(language: &str) -> String {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_suffix_is_dropped() {
        assert_eq!(iso_language("zh-CN"), "zh");
        assert_eq!(iso_language("en_US"), "en");
        assert_eq!(iso_language("fr"), "fr");
    }

    #[test]
    fn base_url_trailing_slash_is_ignored() {
        let config = LlmConfig {
            base_url: "http://localhost:1234/v1/".to_string(),
            ..LlmConfig::default()
        };
        let client = OpenAiClient::new(&config).unwrap();
        assert_eq!(
            client.url("chat/completions"),
            "http://localhost:1234/v1/chat/completions"
        );
    }

    #[test]
    fn chat_request_serializes_lowercase_roles() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest {
            model: "gpt-4o",
            messages: &messages,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
    }
}
