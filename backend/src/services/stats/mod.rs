//! `GET /api/stats`: dashboard numbers of the resource library.

use crate::services::blocking;
use crate::services::state::AppState;
use actix_web::web::{get, scope};
use actix_web::{web, HttpResponse, Responder, ResponseError, Scope};

const API_PATH: &str = "/api/stats";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("", get().to(process))
}

async fn process(state: web::Data<AppState>) -> impl Responder {
    let store = state.store.clone();
    match blocking(move || store.stats()).await {
        Ok(stats) => HttpResponse::Ok().json(stats),
        Err(e) => e.error_response(),
    }
}
