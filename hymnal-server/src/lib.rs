//! hymnal-server library - favorites service
//!
//! Serves hymn lookup and per-account favorites over HTTP, backed by SQLite.

use axum::routing::{delete, get};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// Authentication is enforced per handler through the `SessionUser`
/// extractor, since `GET /api/users/favorites` is public for some queries.
pub fn build_router(state: AppState) -> Router {
    let hymns = Router::new()
        .route("/api/hymns", get(api::list_hymns))
        .route("/api/hymns/:id", get(api::get_hymn));

    let favorites = Router::new()
        .route(
            "/api/users/favorites",
            get(api::get_favorites)
                .post(api::add_favorite)
                .delete(api::remove_favorite),
        )
        .route(
            "/api/users/favorites/:hymn_id",
            delete(api::remove_favorite_by_path),
        );

    Router::new()
        .merge(hymns)
        .merge(favorites)
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
