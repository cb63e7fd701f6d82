//! Per-account favorite records
//!
//! The `(user_id, hymn_id)` primary key enforces at-most-once; an add that
//! hits it reports `false` instead of failing.

use hymnal_common::models::PopularHymn;
use hymnal_common::{HymnId, HymnSummary, Result};
use sqlx::{Row, SqlitePool};
use tracing::debug;

/// Record a favorite
///
/// Returns `true` if the favorite was created, `false` if it already existed.
pub async fn add_favorite(db: &SqlitePool, user_id: &str, hymn_id: &HymnId) -> Result<bool> {
    let result = sqlx::query(
        "INSERT INTO favorites (user_id, hymn_id) VALUES (?, ?) ON CONFLICT (user_id, hymn_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(hymn_id.as_str())
    .execute(db)
    .await?;

    let created = result.rows_affected() == 1;
    debug!(user_id, hymn_id = %hymn_id, created, "add_favorite");
    Ok(created)
}

/// Delete a favorite
///
/// Returns `true` if a record was removed, `false` if none existed.
pub async fn remove_favorite(db: &SqlitePool, user_id: &str, hymn_id: &HymnId) -> Result<bool> {
    let result = sqlx::query("DELETE FROM favorites WHERE user_id = ? AND hymn_id = ?")
        .bind(user_id)
        .bind(hymn_id.as_str())
        .execute(db)
        .await?;

    let removed = result.rows_affected() > 0;
    debug!(user_id, hymn_id = %hymn_id, removed, "remove_favorite");
    Ok(removed)
}

/// Favorites of one account, oldest first
pub async fn list_favorites(db: &SqlitePool, user_id: &str) -> Result<Vec<HymnSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT h.guid, h.title, h.author, h.lyrics
        FROM favorites f
        JOIN hymns h ON h.guid = f.hymn_id
        WHERE f.user_id = ?
        ORDER BY f.created_at ASC, f.rowid ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    rows.iter()
        .map(|row| -> Result<HymnSummary> {
            let lyrics: String = row.try_get("lyrics")?;
            Ok(HymnSummary {
                id: HymnId::new(row.try_get::<String, _>("guid")?)?,
                title: row.try_get("title")?,
                author: row.try_get("author")?,
                lyrics: (!lyrics.is_empty()).then_some(lyrics),
            })
        })
        .collect()
}

pub async fn is_favorited(db: &SqlitePool, user_id: &str, hymn_id: &HymnId) -> Result<bool> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM favorites WHERE user_id = ? AND hymn_id = ?")
            .bind(user_id)
            .bind(hymn_id.as_str())
            .fetch_optional(db)
            .await?;
    Ok(found.is_some())
}

/// Total number of favorite records across all accounts
pub async fn global_count(db: &SqlitePool) -> Result<u64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favorites")
        .fetch_one(db)
        .await?;
    Ok(count.max(0) as u64)
}

/// The hymn favorited by the most accounts
///
/// Ties go to the alphabetically first title. `None` when nobody has
/// favorited anything.
pub async fn most_popular(db: &SqlitePool) -> Result<Option<PopularHymn>> {
    let row = sqlx::query(
        r#"
        SELECT h.guid, h.title, h.author, COUNT(*) AS count
        FROM favorites f
        JOIN hymns h ON h.guid = f.hymn_id
        GROUP BY h.guid
        ORDER BY count DESC, h.title COLLATE NOCASE ASC
        LIMIT 1
        "#,
    )
    .fetch_optional(db)
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let count: i64 = row.try_get("count")?;
    Ok(Some(PopularHymn {
        hymn_id: HymnId::new(row.try_get::<String, _>("guid")?)?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        count: count.max(0) as u64,
    }))
}
