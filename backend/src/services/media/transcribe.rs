use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::Transcription;
use futures_util::StreamExt;
use log::debug;

/// Uploads above this size are rejected before reaching the provider.
const MAX_AUDIO_BYTES: usize = 25 * 1024 * 1024;

/// `POST /api/media/transcribe`
pub async fn process(state: web::Data<AppState>, payload: Multipart) -> impl Responder {
    match transcribe(&state, payload).await {
        Ok(text) => HttpResponse::Ok().json(Transcription { text }),
        Err(e) => e.error_response(),
    }
}

async fn transcribe(state: &AppState, mut payload: Multipart) -> Result<String, AppError> {
    let mut audio: Option<(String, Vec<u8>)> = None;
    let mut language = "zh".to_string();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| AppError::BadRequest(e.to_string()))?;
        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| AppError::BadRequest(e.to_string()))?;
            if bytes.len() + chunk.len() > MAX_AUDIO_BYTES {
                return Err(AppError::BadRequest(format!(
                    "audio must be at most {MAX_AUDIO_BYTES} bytes"
                )));
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_else(|| "audio.wav".to_string());
                audio = Some((file_name, bytes));
            }
            Some("language") => {
                let value = String::from_utf8_lossy(&bytes).trim().to_string();
                if !value.is_empty() {
                    language = value;
                }
            }
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    let (file_name, bytes) = audio
        .filter(|(_, bytes)| !bytes.is_empty())
        .ok_or_else(|| AppError::BadRequest("an audio `file` part is required".to_string()))?;
    Ok(state.speech.transcribe(&file_name, bytes, &language).await?)
}
