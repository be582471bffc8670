use crate::services::blocking;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::resource::Resource;

/// `GET /api/resources/{id}`
pub async fn process(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    match load(&state, path.into_inner()).await {
        Ok(resource) => HttpResponse::Ok().json(resource),
        Err(e) => e.error_response(),
    }
}

pub(super) async fn load(state: &AppState, id: i64) -> Result<Resource, AppError> {
    let store = state.store.clone();
    blocking(move || store.get(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resource {id} not found")))
}
