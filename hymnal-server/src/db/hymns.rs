//! Hymn queries
//!
//! `favorites_count` is always computed from the favorites table with a
//! correlated subquery; no counter column exists to drift.

use std::path::Path;

use chrono::NaiveDateTime;
use hymnal_common::models::normalize_tags;
use hymnal_common::{Error, Hymn, HymnId, Result};
use serde::Deserialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::{info, warn};

use crate::pagination::{ListingPage, PAGE_SIZE};

const HYMN_COLUMNS: &str = r#"
    h.guid, h.title, h.author, h.lyrics, h.hymn_number, h.category, h.tags,
    h.language, h.created_at,
    (SELECT COUNT(*) FROM favorites f WHERE f.hymn_id = h.guid) AS favorites_count
"#;

/// Filter clause shared by the count and page queries
///
/// `?1` is the LIKE pattern (or NULL), `?2` the category (or NULL).
const HYMN_FILTER: &str = r#"
    WHERE (?1 IS NULL
           OR h.title LIKE ?1 ESCAPE '\'
           OR h.author LIKE ?1 ESCAPE '\'
           OR h.tags LIKE ?1 ESCAPE '\')
      AND (?2 IS NULL OR h.category = ?2 COLLATE NOCASE)
"#;

/// Sort order of the hymn listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HymnSort {
    /// Insertion order
    #[default]
    Default,
    Title,
    Author,
    /// Numbered hymns first, unnumbered last
    HymnNumber,
    /// Most favorited first
    Favorites,
}

impl HymnSort {
    /// Parse the `sort` query parameter; unknown values fall back to default
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("title") => HymnSort::Title,
            Some("author") => HymnSort::Author,
            Some("hymnNumber") | Some("number") => HymnSort::HymnNumber,
            Some("favorites") | Some("popular") => HymnSort::Favorites,
            _ => HymnSort::Default,
        }
    }

    fn order_by(self) -> &'static str {
        match self {
            HymnSort::Default => "h.rowid ASC",
            HymnSort::Title => "h.title COLLATE NOCASE ASC, h.rowid ASC",
            HymnSort::Author => "h.author COLLATE NOCASE ASC, h.title COLLATE NOCASE ASC",
            HymnSort::HymnNumber => "h.hymn_number IS NULL, h.hymn_number ASC, h.rowid ASC",
            HymnSort::Favorites => "favorites_count DESC, h.title COLLATE NOCASE ASC",
        }
    }
}

/// Parameters of a hymn listing request
#[derive(Debug, Clone, Default)]
pub struct HymnQuery {
    /// Case-insensitive substring matched against title, author and tags
    pub search: Option<String>,
    /// Exact category name (case-insensitive)
    pub category: Option<String>,
    pub sort: HymnSort,
    /// Requested page (1-indexed, clamped)
    pub page: i64,
}

/// Hymn to be inserted
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHymn {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub hymn_number: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl NewHymn {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            author: None,
            lyrics: String::new(),
            hymn_number: None,
            category: None,
            tags: Vec::new(),
            language: None,
        }
    }
}

/// Wrap a search term in `%…%`, escaping LIKE metacharacters
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn row_to_hymn(row: &SqliteRow) -> Result<Hymn> {
    let id: String = row.try_get("guid")?;
    let tags_json: String = row.try_get("tags")?;
    let tags = serde_json::from_str::<Vec<String>>(&tags_json).unwrap_or_else(|e| {
        warn!("Malformed tags for hymn {}: {}", id, e);
        Vec::new()
    });
    let created_at: Option<NaiveDateTime> = row.try_get("created_at")?;
    let favorites_count: i64 = row.try_get("favorites_count")?;

    Ok(Hymn {
        id: HymnId::new(id)?,
        title: row.try_get("title")?,
        author: row.try_get("author")?,
        lyrics: row.try_get("lyrics")?,
        hymn_number: row.try_get("hymn_number")?,
        category: row.try_get("category")?,
        tags,
        language: row.try_get("language")?,
        favorites_count: favorites_count.max(0) as u64,
        created_at: created_at.map(|t| t.and_utc()),
    })
}

/// Fetch a single hymn, or `None` if no hymn has this id
pub async fn get_hymn(db: &SqlitePool, id: &HymnId) -> Result<Option<Hymn>> {
    let sql = format!("SELECT {} FROM hymns h WHERE h.guid = ?", HYMN_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id.as_str())
        .fetch_optional(db)
        .await?;

    row.as_ref().map(row_to_hymn).transpose()
}

pub async fn hymn_exists(db: &SqlitePool, id: &HymnId) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM hymns WHERE guid = ?")
        .bind(id.as_str())
        .fetch_optional(db)
        .await?;
    Ok(found.is_some())
}

/// One page of hymns matching the query, with the clamped pagination
pub async fn list_hymns(db: &SqlitePool, query: &HymnQuery) -> Result<(Vec<Hymn>, ListingPage)> {
    let pattern = non_blank(&query.search).map(|s| like_pattern(&s));
    let category = non_blank(&query.category);

    let count_sql = format!("SELECT COUNT(*) FROM hymns h {}", HYMN_FILTER);
    let total_results: i64 = sqlx::query_scalar(&count_sql)
        .bind(&pattern)
        .bind(&category)
        .fetch_one(db)
        .await?;

    let page = ListingPage::clamp(total_results, query.page);

    let page_sql = format!(
        "SELECT {} FROM hymns h {} ORDER BY {} LIMIT ?3 OFFSET ?4",
        HYMN_COLUMNS,
        HYMN_FILTER,
        query.sort.order_by()
    );
    let rows = sqlx::query(&page_sql)
        .bind(&pattern)
        .bind(&category)
        .bind(PAGE_SIZE)
        .bind(page.offset())
        .fetch_all(db)
        .await?;

    let hymns = rows.iter().map(row_to_hymn).collect::<Result<Vec<_>>>()?;
    Ok((hymns, page))
}

/// Insert a hymn, returning its id
///
/// Tags are normalized before storage; a generated id is used when none is
/// given.
pub async fn insert_hymn(db: &SqlitePool, hymn: &NewHymn) -> Result<HymnId> {
    let title = hymn.title.trim();
    if title.is_empty() {
        return Err(Error::InvalidInput("Hymn title is required".to_string()));
    }
    if let Some(number) = hymn.hymn_number {
        if number < 1 {
            return Err(Error::InvalidInput(format!(
                "Hymn number must be at least 1, got {}",
                number
            )));
        }
    }

    let id = match &hymn.id {
        Some(id) => HymnId::new(id.clone())?,
        None => HymnId::new(uuid::Uuid::new_v4().to_string())?,
    };
    let tags = serde_json::to_string(&normalize_tags(&hymn.tags))
        .map_err(|e| Error::Internal(format!("Failed to encode tags: {}", e)))?;
    let author = non_blank(&hymn.author).unwrap_or_else(|| hymnal_common::models::UNKNOWN_AUTHOR.to_string());
    let language = non_blank(&hymn.language).unwrap_or_else(|| "English".to_string());

    sqlx::query(
        r#"
        INSERT INTO hymns (guid, title, author, lyrics, hymn_number, category, tags, language)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(id.as_str())
    .bind(title)
    .bind(&author)
    .bind(&hymn.lyrics)
    .bind(hymn.hymn_number)
    .bind(non_blank(&hymn.category))
    .bind(&tags)
    .bind(&language)
    .execute(db)
    .await?;

    Ok(id)
}

/// Load a JSON array of hymns from a file and insert those not yet present
///
/// Returns the number of hymns inserted. Entries whose id already exists
/// are skipped, so importing the same file twice is harmless.
pub async fn import_hymns(db: &SqlitePool, path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    let hymns: Vec<NewHymn> = serde_json::from_str(&content)
        .map_err(|e| Error::InvalidInput(format!("Invalid hymn file {}: {}", path.display(), e)))?;

    let mut inserted = 0;
    for hymn in &hymns {
        if let Some(id) = hymn.id.as_deref() {
            if hymn_exists(db, &HymnId::new(id)?).await? {
                continue;
            }
        }
        insert_hymn(db, hymn).await?;
        inserted += 1;
    }

    info!("Imported {} of {} hymns from {}", inserted, hymns.len(), path.display());
    Ok(inserted)
}
