use crate::pipeline;
use crate::prompts;
use crate::services::error::AppError;
use crate::services::state::AppState;
use actix_web::{web, HttpResponse, Responder, ResponseError};
use common::model::content::ContentRequest;
use common::requests::GeneratedContent;
use log::debug;

/// `POST /api/content/generate`
pub async fn process(
    state: web::Data<AppState>,
    payload: web::Json<ContentRequest>,
) -> impl Responder {
    match generate(&state, payload.into_inner()).await {
        Ok(content) => HttpResponse::Ok().json(GeneratedContent { content }),
        Err(e) => e.error_response(),
    }
}

async fn generate(state: &AppState, req: ContentRequest) -> Result<String, AppError> {
    if !prompts::is_known_content_type(req.content_type.trim()) {
        debug!(
            "Unknown content type '{}', using the generic template",
            req.content_type
        );
    }
    let model = state.model_or_default(req.model.as_deref());
    Ok(pipeline::generate_content(state.completion.as_ref(), &model, &req).await?)
}
