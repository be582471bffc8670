//! Mapping of collaborator errors to HTTP responses.
//!
//! Bodies are plain text. Validation is 400, unknown ids 404, a pipeline
//! step in the wrong stage 409, unparseable model output 422, upstream rate
//! limits 429 (with `Retry-After`), other upstream failures 502, and local
//! storage or rendering failures 500.

use crate::error::{MediaError, PipelineError, ProviderError, RenderError, StorageError};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Media(#[from] MediaError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// A `web::block` task was cancelled or panicked.
    #[error("background task failed: {0}")]
    Blocking(String),
}

impl From<actix_web::error::BlockingError> for AppError {
    fn from(e: actix_web::error::BlockingError) -> Self {
        AppError::Blocking(e.to_string())
    }
}

fn provider_status(e: &ProviderError) -> StatusCode {
    match e {
        ProviderError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    }
}

impl AppError {
    /// Upstream failures that may go away when the request is repeated.
    fn is_retryable(&self) -> bool {
        match self {
            AppError::Provider(e) | AppError::Pipeline(PipelineError::Completion(e)) => {
                e.is_retryable()
            }
            AppError::Media(e) => e.is_retryable(),
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<u64> {
        let provider = match self {
            AppError::Provider(e)
            | AppError::Pipeline(PipelineError::Completion(e))
            | AppError::Media(MediaError::Provider(e)) => e,
            _ => return None,
        };
        match provider {
            ProviderError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Pipeline(e) => match e {
                PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
                PipelineError::InvalidStage { .. } => StatusCode::CONFLICT,
                PipelineError::OutlineParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
                PipelineError::Completion(p) => provider_status(p),
            },
            AppError::Provider(p) => provider_status(p),
            AppError::Media(e) => match e {
                MediaError::Provider(p) => provider_status(p),
                MediaError::Download(_) | MediaError::Image(_) | MediaError::Base64(_) => {
                    StatusCode::BAD_GATEWAY
                }
                MediaError::Unrecognized => StatusCode::UNPROCESSABLE_ENTITY,
                MediaError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Storage(e) => match e {
                StorageError::NotFound(_) => StatusCode::NOT_FOUND,
                StorageError::Validation(_) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Render(_) | AppError::Blocking(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() && !self.is_retryable() {
            error!("{}", self);
        } else {
            warn!("{}", self);
        }

        let mut response = HttpResponse::build(status);
        response.content_type("text/plain; charset=utf-8");
        if let Some(secs) = self.retry_after() {
            response.insert_header(("Retry-After", secs.to_string()));
        }
        response.body(self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_error_kind() {
        let cases: Vec<(AppError, StatusCode)> = vec![
            (
                PipelineError::Validation("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                PipelineError::OutlineParse("x".into()).into(),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                PipelineError::Completion(ProviderError::Unauthorized { status: 401 }).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (StorageError::NotFound(3).into(), StatusCode::NOT_FOUND),
            (
                StorageError::Validation("x".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                RenderError::Pdf("x".into()).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (MediaError::Unrecognized.into(), StatusCode::UNPROCESSABLE_ENTITY),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn rate_limits_carry_retry_after() {
        let err: AppError = MediaError::Provider(ProviderError::RateLimited {
            retry_after_secs: 30,
        })
        .into();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "30");
    }

    #[test]
    fn only_transient_upstream_failures_are_retryable() {
        let cases: Vec<(AppError, bool)> = vec![
            (
                ProviderError::Api {
                    status: 503,
                    message: String::new(),
                }
                .into(),
                true,
            ),
            (
                PipelineError::Completion(ProviderError::RateLimited {
                    retry_after_secs: 5,
                })
                .into(),
                true,
            ),
            (MediaError::Provider(ProviderError::EmptyResponse).into(), false),
            (ProviderError::Unauthorized { status: 401 }.into(), false),
            (MediaError::Unrecognized.into(), false),
            (StorageError::NotFound(1).into(), false),
            (RenderError::Pdf("x".into()).into(), false),
        ];
        for (err, retryable) in cases {
            assert_eq!(err.is_retryable(), retryable, "{err}");
        }
    }
}
