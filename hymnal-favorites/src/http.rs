//! HTTP plumbing shared by the service clients

use std::time::Duration;

use hymnal_common::api::types::ErrorResponse;
use reqwest::{Response, StatusCode};

use crate::error::FavoriteError;

const USER_AGENT: &str = concat!("hymnal-fav/", env!("CARGO_PKG_VERSION"));

/// HTTP client with an explicit per-request timeout
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, FavoriteError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| FavoriteError::Network(e.to_string()))
}

/// Join a base URL and an absolute path without doubling the slash
pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Map a non-success response to the favorites taxonomy
///
/// 404 maps to `NotFound`; callers that want a different reading of 404
/// check the status before calling this.
pub(crate) async fn error_from_response(response: Response) -> FavoriteError {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => FavoriteError::Unauthenticated,
        StatusCode::CONFLICT => FavoriteError::AlreadyExists,
        StatusCode::NOT_FOUND => FavoriteError::NotFound,
        StatusCode::BAD_REQUEST => FavoriteError::MissingHymnId,
        _ => {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            FavoriteError::Server {
                status: status.as_u16(),
                message,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://h:1/", "/api/x"), "http://h:1/api/x");
        assert_eq!(join_url("http://h:1", "/api/x"), "http://h:1/api/x");
    }

    #[test]
    fn test_client_creation() {
        assert!(build_client(Duration::from_secs(10)).is_ok());
    }
}
