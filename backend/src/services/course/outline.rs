use crate::error::PipelineError;
use crate::pipeline;
use crate::services::course::load_session;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::{OutlineRequest, OutlineResponse};

/// `POST /api/course/outline`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<OutlineRequest>,
) -> impl Responder {
    match request_outline(&state, payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

async fn request_outline(
    state: &AppState,
    req: OutlineRequest,
) -> Result<OutlineResponse, AppError> {
    let created = req.session_id.is_none();
    let mut ctx = match req.session_id.as_deref() {
        Some(id) => load_session(state, id).await?,
        None => {
            state
                .sessions
                .create(&state.model_or_default(req.model.as_deref()))
                .await
        }
    };
    if let Some(model) = req.model.as_deref().map(str::trim).filter(|m| !m.is_empty()) {
        ctx.model = model.to_string();
    }

    let result = pipeline::request_outline(state.completion.as_ref(), &mut ctx, req.form).await;
    let session_id = ctx.id.clone();
    if created && matches!(result, Err(PipelineError::Validation(_))) {
        state.sessions.remove(&session_id).await;
    } else {
        state.sessions.put(ctx).await;
    }

    Ok(OutlineResponse {
        session_id,
        outline: result?,
    })
}
