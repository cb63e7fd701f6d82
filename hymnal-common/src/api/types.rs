//! Shared API request/response types
//!
//! Payloads of the favorites wire contract. Field names are camelCase on the
//! wire.

use serde::{Deserialize, Serialize};

use crate::models::{Hymn, HymnSummary, PopularHymn};

// ========================================
// Favorites
// ========================================

/// Body of `POST /api/users/favorites`
///
/// `hymn_id` is optional so that a missing id is reported as 400 by the
/// handler instead of a body parse failure.
///
/// # Examples
///
/// ```
/// use hymnal_common::api::types::AddFavoriteRequest;
///
/// let request: AddFavoriteRequest = serde_json::from_str(r#"{"hymnId":"h1"}"#).unwrap();
/// assert_eq!(request.hymn_id.as_deref(), Some("h1"));
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavoriteRequest {
    #[serde(default)]
    pub hymn_id: Option<String>,
}

/// Response of `GET /api/users/favorites`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoritesResponse {
    pub favorites: Vec<HymnSummary>,
}

/// Response of `GET /api/users/favorites?checkHymn=<id>`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IsFavoritedResponse {
    pub is_favorited: bool,
}

/// Response of `GET /api/users/favorites?globalCount=true`
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct CountResponse {
    pub count: u64,
}

/// Response of `GET /api/users/favorites?popular=true`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularResponse {
    pub most_popular: Option<PopularHymn>,
}

// ========================================
// Hymns
// ========================================

/// Paginated response of `GET /api/hymns`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HymnListResponse {
    pub hymns: Vec<Hymn>,
    pub total_results: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

// ========================================
// Generic Responses
// ========================================

/// Success acknowledgement
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Error body returned with every non-2xx status
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_favorite_request_missing_id() {
        let request: AddFavoriteRequest = serde_json::from_str("{}").unwrap();
        assert!(request.hymn_id.is_none());
    }

    #[test]
    fn test_is_favorited_wire_name() {
        let json = serde_json::to_string(&IsFavoritedResponse { is_favorited: true }).unwrap();
        assert_eq!(json, r#"{"isFavorited":true}"#);
    }

    #[test]
    fn test_popular_response_null() {
        let json = serde_json::to_string(&PopularResponse { most_popular: None }).unwrap();
        assert_eq!(json, r#"{"mostPopular":null}"#);
    }

    #[test]
    fn test_favorites_response_parses_summaries() {
        let json = r#"{"favorites":[{"id":"h1","title":"Abide","author":"Lyte"}]}"#;
        let response: FavoritesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.favorites.len(), 1);
        assert_eq!(response.favorites[0].id.as_str(), "h1");
        assert!(response.favorites[0].lyrics.is_none());
    }
}
