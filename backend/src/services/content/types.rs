use crate::prompts;
use actix_web::{HttpResponse, Responder};

/// `GET /api/content/types`
pub async fn process() -> impl Responder {
    HttpResponse::Ok().json(prompts::content_types())
}
