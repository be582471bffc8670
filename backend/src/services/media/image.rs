use super::media_file;
use crate::media::ImageRequest;
use crate::services::blocking;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::{ImageGenerationRequest, MediaFile};

/// `POST /api/media/image`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<ImageGenerationRequest>,
) -> impl Responder {
    match generate(&state, payload.into_inner()).await {
        Ok(file) => HttpResponse::Ok().json(file),
        Err(e) => e.error_response(),
    }
}

async fn generate(state: &AppState, req: ImageGenerationRequest) -> Result<MediaFile, AppError> {
    if req.prompt.trim().is_empty() {
        return Err(AppError::BadRequest("prompt must not be empty".to_string()));
    }
    let bytes = state
        .images
        .generate(&ImageRequest::new(&req.prompt, &req.style))
        .await?;

    let media = state.media.clone();
    let path = blocking(move || media.save_image(&bytes)).await?;
    Ok(media_file(&path))
}
