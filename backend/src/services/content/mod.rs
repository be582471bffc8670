//! Single-shot content generation for the content page.
//!
//! * `GET /api/content/types`: labels of the content-type templates.
//! * `POST /api/content/generate`: fill a template and return the model's text.
//! * `POST /api/content/pdf`: render text as a PDF download (also kept in the
//!   resource directory).

mod generate;
mod pdf;
mod types;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/content";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/types", get().to(types::process))
        .route("/generate", post().to(generate::process))
        .route("/pdf", post().to(pdf::process))
}
