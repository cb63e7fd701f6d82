//! Hymn models shared by the client and the service

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Title used for a favorite whose hymn can no longer be resolved
pub const UNKNOWN_HYMN_TITLE: &str = "Unknown Hymn";

/// Author used when a hymn has no author, or cannot be resolved
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Number of lyric lines shown in a favorites preview
const PREVIEW_LINES: usize = 3;

/// Opaque identifier of a hymn
///
/// Never empty. Existence of the referenced hymn is only known to the service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HymnId(String);

impl HymnId {
    /// Create an identifier, rejecting empty or whitespace-only input
    ///
    /// Anything else is kept byte for byte.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(Error::InvalidInput("Hymn ID is required".to_string()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for HymnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HymnId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for HymnId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Full hymn record as served by `GET /api/hymns/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hymn {
    pub id: HymnId,
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub hymn_number: Option<i64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Derived from the favorites table on every read, never stored
    #[serde(default)]
    pub favorites_count: u64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_author() -> String {
    UNKNOWN_AUTHOR.to_string()
}

fn default_language() -> String {
    "English".to_string()
}

impl Hymn {
    /// Project the fields needed to render a favorites list
    pub fn summary(&self) -> HymnSummary {
        HymnSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            author: self.author.clone(),
            lyrics: if self.lyrics.is_empty() {
                None
            } else {
                Some(self.lyrics.clone())
            },
        }
    }
}

/// Lowercase, trim and de-duplicate tags, keeping first-seen order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim().to_lowercase();
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Read-only projection used to render a favorites listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HymnSummary {
    pub id: HymnId,
    pub title: String,
    #[serde(default = "default_author")]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<String>,
}

impl HymnSummary {
    /// First three lyric lines, with a trailing `...` when there are more
    pub fn lyrics_preview(&self) -> Option<String> {
        let lyrics = self.lyrics.as_deref()?;
        let lines: Vec<&str> = lyrics.lines().collect();
        let mut preview = lines
            .iter()
            .take(PREVIEW_LINES)
            .copied()
            .collect::<Vec<_>>()
            .join("\n");
        if lines.len() > PREVIEW_LINES {
            preview.push_str("...");
        }
        Some(preview)
    }
}

/// Most-favorited hymn across all accounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopularHymn {
    pub hymn_id: HymnId,
    pub title: String,
    pub author: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hymn_id_rejects_blank() {
        assert!(HymnId::new("").is_err());
        assert!(HymnId::new("   ").is_err());
        assert!(HymnId::new("\t\n").is_err());
    }

    #[test]
    fn test_hymn_id_is_opaque() {
        assert_eq!(HymnId::new(" h1").unwrap().as_str(), " h1");
        assert_ne!(HymnId::new(" h1").unwrap(), HymnId::new("h1").unwrap());
    }

    #[test]
    fn test_hymn_id_serializes_as_plain_string() {
        let id = HymnId::new("h1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"h1\"");
    }

    #[test]
    fn test_hymn_wire_format_is_camel_case() {
        let json = serde_json::json!({
            "id": "h1",
            "title": "Amazing Grace",
            "lyrics": "Amazing grace",
            "hymnNumber": 12,
            "favoritesCount": 3
        });
        let hymn: Hymn = serde_json::from_value(json).unwrap();
        assert_eq!(hymn.author, "Unknown");
        assert_eq!(hymn.language, "English");
        assert_eq!(hymn.hymn_number, Some(12));
        assert_eq!(hymn.favorites_count, 3);
    }

    #[test]
    fn test_summary_drops_empty_lyrics() {
        let hymn = Hymn {
            id: HymnId::new("h1").unwrap(),
            title: "T".to_string(),
            author: "A".to_string(),
            lyrics: String::new(),
            hymn_number: None,
            category: None,
            tags: vec![],
            language: "English".to_string(),
            favorites_count: 0,
            created_at: None,
        };
        assert_eq!(hymn.summary().lyrics, None);
    }

    #[test]
    fn test_lyrics_preview_truncates_after_three_lines() {
        let summary = HymnSummary {
            id: HymnId::new("h1").unwrap(),
            title: "T".to_string(),
            author: "A".to_string(),
            lyrics: Some("one\ntwo\nthree\nfour".to_string()),
        };
        assert_eq!(summary.lyrics_preview().unwrap(), "one\ntwo\nthree...");

        let short = HymnSummary {
            lyrics: Some("one\ntwo".to_string()),
            ..summary
        };
        assert_eq!(short.lyrics_preview().unwrap(), "one\ntwo");
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(["Praise", " praise ", "Grace", ""]);
        assert_eq!(tags, vec!["praise".to_string(), "grace".to_string()]);
    }
}
