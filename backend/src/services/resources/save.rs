use crate::services::blocking;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::resource::NewResource;
use common::requests::SavedResource;
use std::path::Path;

/// `POST /api/resources`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<NewResource>,
) -> impl Responder {
    match save(&state, payload.into_inner()).await {
        Ok(id) => HttpResponse::Ok().json(SavedResource { id }),
        Err(e) => e.error_response(),
    }
}

/// Field validation is left to the store; this only keeps file paths inside
/// the resource directory.
async fn save(state: &AppState, resource: NewResource) -> Result<i64, AppError> {
    if let Some(path) = resource.file_path.as_deref().filter(|p| !p.is_empty()) {
        if !state.media.contains(Path::new(path)) {
            return Err(AppError::BadRequest(format!(
                "{path} is not a file of the resource directory"
            )));
        }
    }

    let store = state.store.clone();
    blocking(move || store.save(&resource)).await
}
