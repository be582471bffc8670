//! # Course Generation Service
//!
//! Drives a generation session from the course form to the finished PDF.
//!
//! ## Registered routes (under `/api/course`)
//!
//! * `POST /outline`: start (or restart) a session from a `CourseForm`.
//! * `POST /outline/edit`: rewrite the outline from free-text instructions.
//! * `POST /complete`: generate every lesson and quiz as a background job;
//!   returns the `job_id` to poll.
//! * `GET /status/{job_id}`: the job's `JobStatus`.
//! * `GET /session/{session_id}`: snapshot of the session for redrawing.
//! * `POST /session/{session_id}/reset`: start a new course in the session.
//! * `DELETE /session/{session_id}/history`: clear the chat history.
//! * `POST /session/{session_id}/model`: switch the session's model.
//! * `GET /pdf/{session_id}`: the finished course as a PDF download.

mod complete;
mod edit;
mod outline;
mod pdf;
mod session;
mod status;

use crate::pipeline::SessionContext;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::web::{delete, get, post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/course";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/outline", post().to(outline::process))
        .route("/outline/edit", post().to(edit::process))
        .route("/complete", post().to(complete::process))
        .route("/status/{job_id}", get().to(status::process))
        .route("/session/{session_id}", get().to(session::snapshot))
        .route("/session/{session_id}/reset", post().to(session::reset))
        .route(
            "/session/{session_id}/history",
            delete().to(session::clear_history),
        )
        .route("/session/{session_id}/model", post().to(session::set_model))
        .route("/pdf/{session_id}", get().to(pdf::process))
}

async fn load_session(state: &AppState, session_id: &str) -> Result<SessionContext, AppError> {
    state
        .sessions
        .get(session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {session_id} not found")))
}
