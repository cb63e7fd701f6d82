//! Favorites of an anonymous visitor, kept in local storage
//!
//! Stored under `favoriteHymns` as a JSON array of id strings. Reads never
//! fail: absent or malformed data is an empty set. Writes are best-effort.

use std::sync::Arc;

use async_trait::async_trait;
use hymnal_common::HymnId;
use tracing::{debug, warn};

use crate::error::FavoriteError;
use crate::storage::KeyValueStorage;
use crate::store::FavoriteStore;

/// Storage key of the anonymous favorite set
pub const LOCAL_FAVORITES_KEY: &str = "favoriteHymns";

#[derive(Clone)]
pub struct LocalFavoriteStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl LocalFavoriteStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Persisted favorites, empty if absent or unparsable
    pub fn load(&self) -> Vec<HymnId> {
        let raw = match self.storage.get(LOCAL_FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read local favorites: {}", e);
                return Vec::new();
            }
        };

        let ids: Vec<String> = match serde_json::from_str(&raw) {
            Ok(ids) => ids,
            Err(e) => {
                warn!("Ignoring malformed local favorites: {}", e);
                return Vec::new();
            }
        };

        dedup(ids.into_iter().filter_map(|id| HymnId::new(id).ok()))
    }

    /// Overwrite the persisted set, dropping duplicates but keeping order
    pub fn save(&self, ids: &[HymnId]) -> hymnal_common::Result<()> {
        let ids = dedup(ids.iter().cloned());
        let json = serde_json::to_string(&ids)
            .map_err(|e| hymnal_common::Error::Internal(format!("Failed to encode favorites: {}", e)))?;
        self.storage.set(LOCAL_FAVORITES_KEY, &json)?;
        debug!("Saved {} local favorites", ids.len());
        Ok(())
    }

    pub fn clear(&self) -> hymnal_common::Result<()> {
        self.storage.remove(LOCAL_FAVORITES_KEY)
    }

    fn save_best_effort(&self, ids: &[HymnId]) {
        if let Err(e) = self.save(ids) {
            warn!("Failed to save local favorites: {}", e);
        }
    }
}

fn dedup(ids: impl IntoIterator<Item = HymnId>) -> Vec<HymnId> {
    let mut out: Vec<HymnId> = Vec::new();
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}

#[async_trait]
impl FavoriteStore for LocalFavoriteStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn list(&self) -> Result<Vec<HymnId>, FavoriteError> {
        Ok(self.load())
    }

    fn snapshot(&self) -> Option<Vec<HymnId>> {
        Some(self.load())
    }

    async fn add(&self, hymn_id: &HymnId) -> Result<(), FavoriteError> {
        let mut ids = self.load();
        if !ids.contains(hymn_id) {
            ids.push(hymn_id.clone());
            self.save_best_effort(&ids);
        }
        Ok(())
    }

    async fn remove(&self, hymn_id: &HymnId) -> Result<(), FavoriteError> {
        let mut ids = self.load();
        let before = ids.len();
        ids.retain(|id| id != hymn_id);
        if ids.len() != before {
            self.save_best_effort(&ids);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<Vec<HymnId>, FavoriteError> {
        if let Err(e) = LocalFavoriteStore::clear(self) {
            warn!("Failed to clear local favorites: {}", e);
            return Ok(self.load());
        }
        Ok(Vec::new())
    }
}
