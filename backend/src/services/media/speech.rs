use super::media_file;
use crate::services::blocking;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::{MediaFile, SpeechRequest};

/// `POST /api/media/speech`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<SpeechRequest>,
) -> impl Responder {
    match synthesize(&state, payload.into_inner()).await {
        Ok(file) => HttpResponse::Ok().json(file),
        Err(e) => e.error_response(),
    }
}

async fn synthesize(state: &AppState, req: SpeechRequest) -> Result<MediaFile, AppError> {
    if req.text.trim().is_empty() {
        return Err(AppError::BadRequest("text must not be empty".to_string()));
    }
    let audio = state.speech.synthesize(&req.text, &req.language).await?;

    let media = state.media.clone();
    let path = blocking(move || media.save_audio(&audio)).await?;
    Ok(media_file(&path))
}
