use super::get;
use crate::services::blocking;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::resource::Feedback;
use common::requests::{FeedbackRequest, SavedResource};

/// `POST /api/resources/{id}/feedback`
///
/// Ratings outside 1..=5 are rejected with 400, unknown resources with 404.
pub async fn process(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<FeedbackRequest>,
) -> impl Responder {
    let resource_id = path.into_inner();
    let FeedbackRequest { rating, comment } = payload.into_inner();
    let store = state.store.clone();
    match blocking(move || store.add_feedback(resource_id, rating, &comment)).await {
        Ok(id) => HttpResponse::Ok().json(SavedResource { id }),
        Err(e) => e.error_response(),
    }
}

/// `GET /api/resources/{id}/feedback`
///
/// Ratings of a resource, oldest first.
pub async fn list(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let resource_id = path.into_inner();
    match ratings(&state, resource_id).await {
        Ok(feedback) => HttpResponse::Ok().json(feedback),
        Err(e) => e.error_response(),
    }
}

async fn ratings(state: &AppState, resource_id: i64) -> Result<Vec<Feedback>, AppError> {
    get::load(state, resource_id).await?;
    let store = state.store.clone();
    blocking(move || store.feedback(resource_id)).await
}
