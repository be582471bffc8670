use crate::error::PipelineError;
use crate::pipeline;
use crate::services::course::load_session;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::course::SessionStage;
use common::requests::{SessionSnapshot, SetModelRequest};
use log::info;

/// `GET /api/course/session/{session_id}`
pub async fn snapshot(state: web::Data<AppState>, session_id: web::Path<String>) -> impl Responder {
    match load_session(&state, &session_id).await {
        Ok(ctx) => HttpResponse::Ok().json(ctx.snapshot()),
        Err(e) => e.error_response(),
    }
}

/// `POST /api/course/session/{session_id}/reset`
pub async fn reset(state: web::Data<AppState>, session_id: web::Path<String>) -> impl Responder {
    let result = update(&state, &session_id, "reset the session", |ctx| {
        pipeline::reset(ctx);
        Ok(())
    })
    .await;
    respond(result)
}

/// `DELETE /api/course/session/{session_id}/history`
pub async fn clear_history(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
) -> impl Responder {
    respond(
        update(&state, &session_id, "clear the history", |ctx| {
            pipeline::clear_history(ctx);
            Ok(())
        })
        .await,
    )
}

/// `POST /api/course/session/{session_id}/model`
pub async fn set_model(
    state: web::Data<AppState>,
    session_id: web::Path<String>,
    payload: web::Json<SetModelRequest>,
) -> impl Responder {
    let model = payload.into_inner().model.trim().to_string();
    let offered = &state.config.llm.models;
    let result = update(&state, &session_id, "change the model", |ctx| {
        if model.is_empty() || (!offered.is_empty() && !offered.contains(&model)) {
            return Err(AppError::BadRequest(format!(
                "model '{model}' is not available"
            )));
        }
        info!("Session {}: model set to {}", ctx.id, model);
        ctx.model = model.clone();
        Ok(())
    })
    .await;
    respond(result)
}

/// Apply `change` to a stored session. A session with a running course job
/// is left alone: the job writes the whole session back when it ends.
async fn update<F>(
    state: &AppState,
    session_id: &str,
    action: &'static str,
    change: F,
) -> Result<SessionSnapshot, AppError>
where
    F: FnOnce(&mut pipeline::SessionContext) -> Result<(), AppError>,
{
    let mut ctx = load_session(state, session_id).await?;
    if ctx.stage == SessionStage::Completing {
        return Err(PipelineError::InvalidStage {
            action,
            stage: ctx.stage,
        }
        .into());
    }
    change(&mut ctx)?;
    let snapshot = ctx.snapshot();
    state.sessions.put(ctx).await;
    Ok(snapshot)
}

fn respond(result: Result<SessionSnapshot, AppError>) -> HttpResponse {
    match result {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => e.error_response(),
    }
}
