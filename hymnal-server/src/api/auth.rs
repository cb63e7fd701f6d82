//! Session extraction for authenticated routes
//!
//! The identity provider records sessions; a request is authenticated when
//! it carries `Authorization: Bearer <token>` naming one of them.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use hymnal_common::api::auth::{parse_bearer, resolve_session, ApiAuthError};
use tracing::debug;

use super::error::ApiError;
use crate::AppState;

/// The account a request was made on behalf of
///
/// Rejects with 401 when the header is missing, malformed, or names an
/// unknown session. Handlers that also serve anonymous callers take
/// `Result<SessionUser, ApiError>` instead.
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(ApiError::Unauthorized)?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?;

        let token = parse_bearer(header).map_err(|_| ApiError::Unauthorized)?;

        match resolve_session(&state.db, token).await {
            Ok(user_id) => Ok(SessionUser { user_id }),
            Err(ApiAuthError::DatabaseError(e)) => Err(ApiError::Database(e)),
            Err(e) => {
                debug!("Rejected session: {}", e);
                Err(ApiError::Unauthorized)
            }
        }
    }
}
