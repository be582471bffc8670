use crate::pipeline;
use crate::services::course::load_session;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::requests::{EditOutlineRequest, OutlineResponse};

/// `POST /api/course/outline/edit`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<EditOutlineRequest>,
) -> impl Responder {
    match edit_outline(&state, payload.into_inner()).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(e) => e.error_response(),
    }
}

async fn edit_outline(
    state: &AppState,
    req: EditOutlineRequest,
) -> Result<OutlineResponse, AppError> {
    let mut ctx = load_session(state, &req.session_id).await?;
    let result =
        pipeline::edit_outline(state.completion.as_ref(), &mut ctx, &req.instructions).await;
    state.sessions.put(ctx).await;

    Ok(OutlineResponse {
        session_id: req.session_id,
        outline: result?,
    })
}
