use crate::services::blocking;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::resource::{Resource, ResourceQuery};

/// `GET /api/resources?search=..&category=..&type=..`
pub async fn process(
    state: web::Data<AppState>,
    query: web::Query<ResourceQuery>,
) -> impl Responder {
    match list(&state, query.into_inner()).await {
        Ok(resources) => HttpResponse::Ok().json(resources),
        Err(e) => e.error_response(),
    }
}

async fn list(state: &AppState, query: ResourceQuery) -> Result<Vec<Resource>, AppError> {
    let store = state.store.clone();
    blocking(move || store.query(&query)).await
}
