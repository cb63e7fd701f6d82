//! API module for the favorites wire contract
//!
//! Provides session handling and the request/response payloads shared by the
//! favorites service and its client.
//!
//! # Design Principle
//!
//! This module contains ONLY:
//! - Pure functions (no HTTP framework dependencies)
//! - Database operations (via sqlx, feature gated)
//! - Shared types
//!
//! The service wraps these with axum extractors; the client with reqwest.

pub mod auth;
pub mod types;

pub use auth::{bearer_header_value, generate_session_token, parse_bearer, ApiAuthError};
pub use types::{
    AddFavoriteRequest, CountResponse, ErrorResponse, FavoritesResponse, HymnListResponse,
    IsFavoritedResponse, MessageResponse, PopularResponse,
};
