//! API error responses
//!
//! Every failure is rendered as `{"error": message}` with the status code of
//! the favorites wire contract.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// No valid session token
    #[error("Authentication required")]
    Unauthorized,

    #[error("Hymn ID is required")]
    MissingHymnId,

    #[error("Hymn not found: {0}")]
    HymnNotFound(String),

    #[error("Hymn already in favorites")]
    AlreadyFavorited,

    #[error("Favorite not found")]
    NotFavorited,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingHymnId | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::HymnNotFound(_) | ApiError::NotFavorited => StatusCode::NOT_FOUND,
            ApiError::AlreadyFavorited => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<hymnal_common::Error> for ApiError {
    fn from(err: hymnal_common::Error) -> Self {
        match err {
            hymnal_common::Error::Database(e) => ApiError::Database(e.to_string()),
            hymnal_common::Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            hymnal_common::Error::NotFound(what) => ApiError::HymnNotFound(what),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{}", self);
        }

        // Internals are logged above, not leaked to the caller
        let message = match &self {
            ApiError::Database(_) | ApiError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
