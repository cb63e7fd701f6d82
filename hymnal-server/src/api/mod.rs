//! HTTP API handlers for hymnal-server

pub mod auth;
pub mod buildinfo;
pub mod error;
pub mod favorites;
pub mod health;
pub mod hymns;

pub use auth::SessionUser;
pub use buildinfo::{get_build_info, BuildInfo};
pub use error::ApiError;
pub use favorites::{add_favorite, get_favorites, remove_favorite, remove_favorite_by_path};
pub use health::health_routes;
pub use hymns::{get_hymn, list_hymns};
