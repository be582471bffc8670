//! Status-code handling shared by every provider request.

use crate::error::ProviderError;

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// Return the response unchanged on success, otherwise map its status:
/// 401/403 to [`ProviderError::Unauthorized`], 429 to
/// [`ProviderError::RateLimited`] (honouring `Retry-After`), anything else
/// to [`ProviderError::Api`] with the body as message.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == 401 || status == 403 {
        return Err(ProviderError::Unauthorized {
            status: status.as_u16(),
        });
    }
    if status == 429 {
        return Err(ProviderError::RateLimited {
            retry_after_secs: parse_retry_after(&resp),
        });
    }
    Err(ProviderError::Api {
        status: status.as_u16(),
        message: resp.text().await.unwrap_or_default(),
    })
}

fn parse_retry_after(resp: &reqwest::Response) -> u64 {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_response(status: u16, body: &str) -> reqwest::Response {
        reqwest::Response::from(
            ::http::Response::builder()
                .status(status)
                .body(body.to_string())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn success_passes_through() {
        let resp = check_response(mock_response(200, "{}")).await.unwrap();
        assert_eq!(resp.status(), 200);
    }

    #[tokio::test]
    async fn rejected_key_is_unauthorized() {
        let err = check_response(mock_response(401, "")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unauthorized { status: 401 }));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn rate_limit_reads_retry_after() {
        let resp = reqwest::Response::from(
            ::http::Response::builder()
                .status(429)
                .header("Retry-After", "12")
                .body(String::new())
                .unwrap(),
        );
        let err = check_response(resp).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: 12
            }
        ));
    }

    #[tokio::test]
    async fn rate_limit_without_header_uses_default() {
        let err = check_response(mock_response(429, "")).await.unwrap_err();
        assert!(matches!(
            err,
            ProviderError::RateLimited {
                retry_after_secs: DEFAULT_RETRY_AFTER_SECS
            }
        ));
    }

    #[tokio::test]
    async fn other_errors_keep_the_body() {
        let err = check_response(mock_response(500, "upstream down"))
            .await
            .unwrap_err();
        match err {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
