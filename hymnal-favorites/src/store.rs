//! The capability shared by local and remote favorite sets

use async_trait::async_trait;
use hymnal_common::HymnId;
use tracing::warn;

use crate::error::FavoriteError;

/// A persisted set of favorite hymn ids for one identity
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Short name for logs ("local", "remote")
    fn name(&self) -> &'static str;

    /// Every favorite id, in store order
    async fn list(&self) -> Result<Vec<HymnId>, FavoriteError>;

    /// Stored ids when they can be read without a network round trip
    ///
    /// Local stores answer this; remote stores return `None` and are only
    /// known through `list`.
    fn snapshot(&self) -> Option<Vec<HymnId>> {
        None
    }

    /// Add an id
    ///
    /// Remote stores report an existing id as `AlreadyExists`.
    async fn add(&self, hymn_id: &HymnId) -> Result<(), FavoriteError>;

    /// Remove an id
    ///
    /// Remote stores report a missing id as `NotFound`.
    async fn remove(&self, hymn_id: &HymnId) -> Result<(), FavoriteError>;

    /// Remove every favorite, returning the ids that could not be removed
    async fn clear(&self) -> Result<Vec<HymnId>, FavoriteError> {
        let mut kept = Vec::new();
        for hymn_id in self.list().await? {
            match self.remove(&hymn_id).await {
                Ok(()) | Err(FavoriteError::NotFound) => {}
                Err(FavoriteError::Unauthenticated) => return Err(FavoriteError::Unauthenticated),
                Err(e) => {
                    warn!(store = self.name(), hymn_id = %hymn_id, "Failed to remove favorite: {}", e);
                    kept.push(hymn_id);
                }
            }
        }
        Ok(kept)
    }
}
