//! Turns favorite ids into renderable entries
//!
//! Each id is looked up concurrently; an id that cannot be resolved becomes
//! a placeholder rather than failing the whole list.

use std::sync::Arc;

use futures::future::join_all;
use hymnal_common::models::{UNKNOWN_AUTHOR, UNKNOWN_HYMN_TITLE};
use hymnal_common::{HymnId, HymnSummary};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ReconcileError;
use crate::hymn_client::HymnLookup;

/// Stand-in for a favorite whose hymn could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPlaceholder {
    pub id: HymnId,
    pub title: String,
    pub author: String,
    pub error: bool,
}

impl ErrorPlaceholder {
    pub fn new(id: HymnId) -> Self {
        Self {
            id,
            title: UNKNOWN_HYMN_TITLE.to_string(),
            author: UNKNOWN_AUTHOR.to_string(),
            error: true,
        }
    }
}

/// One row of a favorites listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FavoriteEntry {
    Resolved(HymnSummary),
    Placeholder(ErrorPlaceholder),
}

impl FavoriteEntry {
    pub fn id(&self) -> &HymnId {
        match self {
            FavoriteEntry::Resolved(summary) => &summary.id,
            FavoriteEntry::Placeholder(placeholder) => &placeholder.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            FavoriteEntry::Resolved(summary) => &summary.title,
            FavoriteEntry::Placeholder(placeholder) => &placeholder.title,
        }
    }

    pub fn author(&self) -> &str {
        match self {
            FavoriteEntry::Resolved(summary) => &summary.author,
            FavoriteEntry::Placeholder(placeholder) => &placeholder.author,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FavoriteEntry::Placeholder(_))
    }
}

pub struct FavoritePresenter {
    lookup: Arc<dyn HymnLookup>,
}

impl FavoritePresenter {
    pub fn new(lookup: Arc<dyn HymnLookup>) -> Self {
        Self { lookup }
    }

    async fn resolve_one(&self, hymn_id: &HymnId) -> FavoriteEntry {
        match self.lookup.fetch_hymn(hymn_id).await {
            Ok(hymn) => FavoriteEntry::Resolved(hymn.summary()),
            Err(e) => {
                warn!(hymn_id = %hymn_id, "Could not resolve favorite: {}", e);
                FavoriteEntry::Placeholder(ErrorPlaceholder::new(hymn_id.clone()))
            }
        }
    }

    /// One entry per id, in input order
    pub async fn resolve_all(&self, ids: &[HymnId]) -> Vec<FavoriteEntry> {
        debug!(count = ids.len(), "Resolving favorites");
        join_all(ids.iter().map(|id| self.resolve_one(id))).await
    }

    /// `resolve_all` that gives up as soon as `cancel` fires
    pub async fn resolve_all_cancellable(
        &self,
        ids: &[HymnId],
        cancel: &CancellationToken,
    ) -> Result<Vec<FavoriteEntry>, ReconcileError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ReconcileError::Cancelled),
            entries = self.resolve_all(ids) => Ok(entries),
        }
    }
}
