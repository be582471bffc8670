//! # Resource Library Service
//!
//! ## Registered routes (under `/api/resources`)
//!
//! * `GET /`: list resources, filtered by `search`, `category` and `type`
//!   query parameters (`所有` or empty disables a filter).
//! * `POST /`: save a `NewResource`. Media files must already live in the
//!   resource directory.
//! * `GET /{id}`: one resource.
//! * `DELETE /{id}`: delete the resource, its feedback and its file.
//! * `GET /{id}/file`: the file of a media resource.
//! * `POST /{id}/feedback`: rate a resource 1 to 5.
//! * `GET /{id}/feedback`: the ratings of a resource.

mod delete;
mod feedback;
mod file;
mod get;
mod list;
mod save;

use actix_web::web::{delete as delete_route, get as get_route, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/resources";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("", get_route().to(list::process))
        .route("", post().to(save::process))
        .route("/{id}", get_route().to(get::process))
        .route("/{id}", delete_route().to(delete::process))
        .route("/{id}/file", get_route().to(file::process))
        .route("/{id}/feedback", post().to(feedback::process))
        .route("/{id}/feedback", get_route().to(feedback::list))
}
