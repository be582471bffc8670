use crate::services::blocking;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};

/// `DELETE /api/resources/{id}`
pub async fn process(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let store = state.store.clone();
    match blocking(move || store.delete(id)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.error_response(),
    }
}
