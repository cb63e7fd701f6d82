//! Favorites endpoints
//!
//! `GET /api/users/favorites` multiplexes four reads on its query string;
//! `globalCount` and `popular` are public, the rest need a session.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use hymnal_common::api::types::{
    AddFavoriteRequest, CountResponse, FavoritesResponse, IsFavoritedResponse, MessageResponse,
    PopularResponse,
};
use hymnal_common::HymnId;
use serde::Deserialize;
use tracing::info;

use super::auth::SessionUser;
use super::error::ApiError;
use crate::db;
use crate::AppState;

/// Query string of `GET /api/users/favorites`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesParams {
    pub check_hymn: Option<String>,
    #[serde(default)]
    pub global_count: bool,
    #[serde(default)]
    pub popular: bool,
}

/// Query string of `DELETE /api/users/favorites`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveParams {
    pub hymn_id: Option<String>,
}

fn require_hymn_id(raw: Option<&str>) -> Result<HymnId, ApiError> {
    raw.and_then(|id| HymnId::new(id).ok())
        .ok_or(ApiError::MissingHymnId)
}

/// POST /api/users/favorites
pub async fn add_favorite(
    State(state): State<AppState>,
    user: SessionUser,
    body: Result<Json<AddFavoriteRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let hymn_id = require_hymn_id(request.hymn_id.as_deref())?;

    if !db::hymn_exists(&state.db, &hymn_id).await? {
        return Err(ApiError::HymnNotFound(hymn_id.into_inner()));
    }

    if !db::add_favorite(&state.db, &user.user_id, &hymn_id).await? {
        return Err(ApiError::AlreadyFavorited);
    }

    info!(user_id = %user.user_id, hymn_id = %hymn_id, "Added favorite");
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Added to favorites")),
    )
        .into_response())
}

/// DELETE /api/users/favorites?hymnId=…
pub async fn remove_favorite(
    State(state): State<AppState>,
    user: SessionUser,
    Query(params): Query<RemoveParams>,
) -> Result<Json<MessageResponse>, ApiError> {
    let hymn_id = require_hymn_id(params.hymn_id.as_deref())?;
    remove_for_user(&state, &user, &hymn_id).await
}

/// DELETE /api/users/favorites/:hymn_id
pub async fn remove_favorite_by_path(
    State(state): State<AppState>,
    user: SessionUser,
    Path(hymn_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let hymn_id = require_hymn_id(Some(&hymn_id))?;
    remove_for_user(&state, &user, &hymn_id).await
}

async fn remove_for_user(
    state: &AppState,
    user: &SessionUser,
    hymn_id: &HymnId,
) -> Result<Json<MessageResponse>, ApiError> {
    if !db::remove_favorite(&state.db, &user.user_id, hymn_id).await? {
        return Err(ApiError::NotFavorited);
    }

    info!(user_id = %user.user_id, hymn_id = %hymn_id, "Removed favorite");
    Ok(Json(MessageResponse::new("Removed from favorites")))
}

/// GET /api/users/favorites
///
/// - `?globalCount=true` → `{count}` (public)
/// - `?popular=true` → `{mostPopular}` (public)
/// - `?checkHymn=<id>` → `{isFavorited}`
/// - otherwise → `{favorites}`
pub async fn get_favorites(
    State(state): State<AppState>,
    user: Result<SessionUser, ApiError>,
    Query(params): Query<FavoritesParams>,
) -> Result<Response, ApiError> {
    if params.global_count {
        let count = db::global_count(&state.db).await?;
        return Ok(Json(CountResponse { count }).into_response());
    }

    if params.popular {
        let most_popular = db::most_popular(&state.db).await?;
        return Ok(Json(PopularResponse { most_popular }).into_response());
    }

    let user = user?;

    if let Some(raw) = params.check_hymn.as_deref() {
        let hymn_id = require_hymn_id(Some(raw))?;
        let is_favorited = db::is_favorited(&state.db, &user.user_id, &hymn_id).await?;
        return Ok(Json(IsFavoritedResponse { is_favorited }).into_response());
    }

    let favorites = db::list_favorites(&state.db, &user.user_id).await?;
    Ok(Json(FavoritesResponse { favorites }).into_response())
}
