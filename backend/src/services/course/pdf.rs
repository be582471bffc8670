use crate::services::course::load_session;
use crate::services::error::AppError;
use crate::services::state::AppState;
use crate::services::{blocking, pdf_attachment};
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// `GET /api/course/pdf/{session_id}`
///
/// Renders the finished course, keeps a copy in the resource directory and
/// returns it as an attachment.
pub async fn process(state: web::Data<AppState>, session_id: web::Path<String>) -> impl Responder {
    match course_pdf(&state, &session_id).await {
        Ok((file_name, bytes)) => pdf_attachment(&file_name, bytes),
        Err(e) => e.error_response(),
    }
}

async fn course_pdf(state: &AppState, session_id: &str) -> Result<(String, Vec<u8>), AppError> {
    let ctx = load_session(state, session_id).await?;
    let document = ctx.document.ok_or_else(|| {
        AppError::NotFound(format!("session {session_id} has no finished course"))
    })?;

    let title = if document.course_name.is_empty() {
        "course".to_string()
    } else {
        document.course_name.clone()
    };
    let path = state.media.pdf_path(&title);
    let file_name = state.media.pdf_file_name(&title);

    let renderer = state.renderer.clone();
    let text = document.text();
    let bytes = blocking(move || renderer.export(&title, &text, &path)).await?;
    Ok((file_name, bytes))
}
