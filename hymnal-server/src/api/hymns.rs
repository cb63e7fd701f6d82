//! Hymn lookup and listing

use axum::{
    extract::{Path, Query, State},
    Json,
};
use hymnal_common::api::types::HymnListResponse;
use hymnal_common::{Hymn, HymnId};
use serde::Deserialize;

use super::error::ApiError;
use crate::db::{self, HymnQuery, HymnSort};
use crate::AppState;

/// Query parameters for the hymn listing
#[derive(Debug, Deserialize)]
pub struct HymnListParams {
    pub search: Option<String>,
    pub category: Option<String>,
    /// `title`, `author`, `hymnNumber` or `favorites`
    pub sort: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

/// GET /api/hymns
pub async fn list_hymns(
    State(state): State<AppState>,
    Query(params): Query<HymnListParams>,
) -> Result<Json<HymnListResponse>, ApiError> {
    let query = HymnQuery {
        search: params.search,
        category: params.category,
        sort: HymnSort::from_param(params.sort.as_deref()),
        page: params.page,
    };

    let (hymns, page) = db::list_hymns(&state.db, &query).await?;

    Ok(Json(page.into_response(hymns)))
}

/// GET /api/hymns/:id
pub async fn get_hymn(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Hymn>, ApiError> {
    let hymn_id = HymnId::new(id.clone()).map_err(|_| ApiError::HymnNotFound(id.clone()))?;

    db::get_hymn(&state.db, &hymn_id)
        .await?
        .map(Json)
        .ok_or(ApiError::HymnNotFound(id))
}
