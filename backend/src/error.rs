//! Error types of the server's collaborators.
//!
//! Each external boundary gets its own enum so callers can tell a transient
//! upstream failure (worth retrying by hand) from a permanent one, and so the
//! HTTP layer can pick a status code without string matching.

use common::model::course::SessionStage;
use thiserror::Error;

/// Failure talking to the hosted model provider (completions, images, speech).
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network failure, timeout or unreadable body.
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API key was rejected (401/403).
    #[error("provider rejected the API credentials ({status})")]
    Unauthorized { status: u16 },

    /// 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Any other non-success status.
    #[error("provider error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response parsed but carried no usable payload.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl ProviderError {
    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(e) => !e.is_decode() && !e.is_builder(),
            ProviderError::RateLimited { .. } => true,
            ProviderError::Api { status, .. } => *status >= 500,
            ProviderError::Unauthorized { .. } | ProviderError::EmptyResponse => false,
        }
    }
}

/// Failure producing or storing an image or audio file.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Downloading the generated image from its URL failed.
    #[error("image download failed: {0}")]
    Download(reqwest::Error),

    #[error("invalid image data: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Speech recognition produced no text.
    #[error("speech could not be recognized")]
    Unrecognized,

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Whether repeating the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MediaError::Provider(e) => e.is_retryable(),
            MediaError::Download(_) => true,
            _ => false,
        }
    }
}

/// Failure of the resource store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("resource {0} not found")]
    NotFound(i64),

    #[error("{0}")]
    Validation(String),
}

/// Failure rendering a PDF.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF rendering failed: {0}")]
    Pdf(String),

    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<genpdf::error::Error> for RenderError {
    fn from(e: genpdf::error::Error) -> Self {
        RenderError::Pdf(e.to_string())
    }
}

/// Failure of a generation pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Missing or empty form input; nothing was changed.
    #[error("{0}")]
    Validation(String),

    /// The operation is not allowed in the session's current stage.
    #[error("cannot {action} while the session is {stage:?}")]
    InvalidStage {
        action: &'static str,
        stage: SessionStage,
    },

    /// The model's outline could not be parsed into modules and lessons.
    #[error("could not parse the course structure: {0}")]
    OutlineParse(String),

    #[error(transparent)]
    Completion(#[from] ProviderError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_and_rate_limits_are_retryable() {
        assert!(ProviderError::RateLimited {
            retry_after_secs: 5
        }
        .is_retryable());
        assert!(ProviderError::Api {
            status: 503,
            message: String::new()
        }
        .is_retryable());
        assert!(!ProviderError::Api {
            status: 400,
            message: String::new()
        }
        .is_retryable());
        assert!(!ProviderError::Unauthorized { status: 401 }.is_retryable());
        assert!(!MediaError::Unrecognized.is_retryable());
        assert!(MediaError::Provider(ProviderError::RateLimited {
            retry_after_secs: 1
        })
        .is_retryable());
    }
}
