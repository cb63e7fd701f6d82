//! # Hymnal Common Library
//!
//! Shared code for the hymnal favorites client and service:
//! - Wire models (hymns, summaries, favorites payloads)
//! - Configuration loading and root folder resolution
//! - Database initialization (service side)
//! - Common error type

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod models;

pub use error::{Error, Result};
pub use models::{Hymn, HymnId, HymnSummary};
