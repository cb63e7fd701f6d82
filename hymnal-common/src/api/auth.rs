//! Session token handling
//!
//! Login itself belongs to the external identity provider. Once it has
//! authenticated someone it stores an opaque token in the `sessions` table;
//! every authenticated request then carries `Authorization: Bearer <token>`.
//!
//! # Pure Functions
//!
//! Header parsing is framework independent. Database lookups are gated on the
//! `sqlx` feature so the client crate can use the header helpers alone.

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

/// Scheme prefix of the `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

// ========================================
// Error Types
// ========================================

/// Session resolution errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiAuthError {
    /// No `Authorization` header present
    MissingToken,

    /// Header present but not `Bearer <token>`
    MalformedHeader,

    /// Token does not match any session
    UnknownSession,

    /// Database error resolving the session
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::MissingToken => write!(f, "Missing session token"),
            ApiAuthError::MalformedHeader => write!(f, "Malformed Authorization header"),
            ApiAuthError::UnknownSession => write!(f, "Unknown or expired session"),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Header Helpers
// ========================================

/// Extract the token from an `Authorization` header value
///
/// # Examples
///
/// ```
/// use hymnal_common::api::auth::parse_bearer;
///
/// assert_eq!(parse_bearer("Bearer abc123"), Ok("abc123"));
/// assert!(parse_bearer("Basic abc123").is_err());
/// assert!(parse_bearer("Bearer   ").is_err());
/// ```
pub fn parse_bearer(header_value: &str) -> Result<&str, ApiAuthError> {
    let token = header_value
        .strip_prefix(BEARER_PREFIX)
        .ok_or(ApiAuthError::MalformedHeader)?
        .trim();

    if token.is_empty() {
        return Err(ApiAuthError::MalformedHeader);
    }

    Ok(token)
}

/// Build an `Authorization` header value for a token
pub fn bearer_header_value(token: &str) -> String {
    format!("{}{}", BEARER_PREFIX, token)
}

/// Generate a fresh opaque session token
pub fn generate_session_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

// ========================================
// Session Storage
// ========================================

/// Resolve a session token to the owning user's id
#[cfg(feature = "sqlx")]
pub async fn resolve_session(db: &SqlitePool, token: &str) -> Result<String, ApiAuthError> {
    let user_id: Option<String> =
        sqlx::query_scalar("SELECT user_id FROM sessions WHERE token = ?")
            .bind(token)
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    user_id.ok_or(ApiAuthError::UnknownSession)
}

/// Record a session for a user, returning the new token
///
/// Called by the identity provider integration after it has authenticated
/// the user.
#[cfg(feature = "sqlx")]
pub async fn create_session(db: &SqlitePool, user_id: &str) -> Result<String, ApiAuthError> {
    let token = generate_session_token();

    sqlx::query("INSERT INTO sessions (token, user_id) VALUES (?, ?)")
        .bind(&token)
        .bind(user_id)
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(token)
}

/// Revoke a session (logout)
#[cfg(feature = "sqlx")]
pub async fn revoke_session(db: &SqlitePool, token: &str) -> Result<(), ApiAuthError> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(())
}
