use crate::services::error::AppError;
use crate::services::state::AppState;
use crate::services::{blocking, pdf_attachment};
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::ContentPdfRequest;

/// `POST /api/content/pdf`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<ContentPdfRequest>,
) -> impl Responder {
    match export(&state, payload.into_inner()).await {
        Ok((file_name, bytes)) => pdf_attachment(&file_name, bytes),
        Err(e) => e.error_response(),
    }
}

async fn export(state: &AppState, req: ContentPdfRequest) -> Result<(String, Vec<u8>), AppError> {
    if req.content.trim().is_empty() {
        return Err(AppError::BadRequest("content must not be empty".to_string()));
    }
    let path = state.media.pdf_path(&req.title);
    let file_name = state.media.pdf_file_name(&req.title);

    let renderer = state.renderer.clone();
    let bytes = blocking(move || renderer.export(&req.title, &req.content, &path)).await?;
    Ok((file_name, bytes))
}
