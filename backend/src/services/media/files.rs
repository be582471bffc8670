use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

/// `GET /api/media/files/{name}`
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> HttpResponse {
    let name = path.into_inner();
    let Some(file) = state.media.resolve(&name).filter(|p| state.media.contains(p)) else {
        return AppError::NotFound(format!("Media file {name} not found")).error_response();
    };
    match NamedFile::open_async(&file).await {
        Ok(named) => named.into_response(&req),
        Err(e) => AppError::NotFound(format!("{name}: {e}")).error_response(),
    }
}
