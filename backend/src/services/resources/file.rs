use super::get::load;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_files::NamedFile;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};
use std::path::PathBuf;

/// `GET /api/resources/{id}/file`
///
/// Only files inside the resource directory are served.
pub async fn process(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> HttpResponse {
    let file = match media_path(&state, path.into_inner()).await {
        Ok(file) => file,
        Err(e) => return e.error_response(),
    };
    match NamedFile::open_async(&file).await {
        Ok(named) => named.into_response(&req),
        Err(e) => AppError::NotFound(format!("{}: {e}", file.display())).error_response(),
    }
}

async fn media_path(state: &AppState, id: i64) -> Result<PathBuf, AppError> {
    let resource = load(state, id).await?;
    let path = resource
        .file_path
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .ok_or_else(|| AppError::NotFound(format!("Resource {id} has no file")))?;
    if !state.media.contains(&path) {
        return Err(AppError::NotFound(format!("Resource {id} has no file")));
    }
    Ok(path)
}
