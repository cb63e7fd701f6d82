//! Database access layer for hymnal-server
//!
//! Schema creation lives in `hymnal_common::db`; this module holds the
//! queries the handlers run.

pub mod favorites;
pub mod hymns;

pub use favorites::{
    add_favorite, global_count, is_favorited, list_favorites, most_popular, remove_favorite,
};
pub use hymns::{get_hymn, hymn_exists, import_hymns, insert_hymn, list_hymns, HymnQuery, HymnSort, NewHymn};
