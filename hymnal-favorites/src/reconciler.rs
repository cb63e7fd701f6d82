//! Favorite reconciler
//!
//! Owns the in-memory favorite state for one identity and keeps it in step
//! with the store chosen for that identity at construction. Toggles are
//! optimistic: the state changes first, the store write follows, and a
//! failed write is undone.
//!
//! The state mutex is a `std::sync::Mutex` and is never held across an
//! await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hymnal_common::HymnId;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::{FavoriteError, ReconcileError};
use crate::identity::IdentityMode;
use crate::local_store::LocalFavoriteStore;
use crate::remote_store::RemoteFavoriteStore;
use crate::state::{FavoriteState, Mutation};
use crate::store::FavoriteStore;

/// How a successful toggle landed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// The store already held it; the flag stays set, the count is unchanged
    AlreadyFavorited,
    /// The store did not hold it; the flag stays clear, the count is unchanged
    NotFavorited,
}

/// State of one hymn after a toggle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteResult {
    pub hymn_id: HymnId,
    pub favorited: bool,
    pub favorites_count: u64,
    pub outcome: ToggleOutcome,
}

pub struct FavoriteReconciler {
    mode: IdentityMode,
    store: Arc<dyn FavoriteStore>,
    state: Mutex<FavoriteState>,
    cancel: CancellationToken,
}

impl FavoriteReconciler {
    /// Reconciler over the store matching `mode`
    ///
    /// Anonymous visitors get the local store; authenticated ones get the
    /// remote store for the configured server. The choice is final.
    pub fn for_identity(
        mode: IdentityMode,
        local: LocalFavoriteStore,
        config: &ClientConfig,
    ) -> Result<Self, FavoriteError> {
        let store: Arc<dyn FavoriteStore> = match &mode {
            IdentityMode::Anonymous => Arc::new(local),
            IdentityMode::Authenticated { session_token } => Arc::new(RemoteFavoriteStore::new(
                config.server_url.clone(),
                session_token.clone(),
                config.request_timeout,
            )?),
        };
        Ok(Self::with_store(mode, store))
    }

    /// Reconciler over an explicit store
    ///
    /// A store that can be read synchronously seeds the state; a remote one
    /// starts empty until `refresh`.
    pub fn with_store(mode: IdentityMode, store: Arc<dyn FavoriteStore>) -> Self {
        let ids = store.snapshot().unwrap_or_default();
        debug!(?mode, store = store.name(), seeded = ids.len(), "Created favorite reconciler");
        Self {
            mode,
            store,
            state: Mutex::new(FavoriteState::new(ids)),
            cancel: CancellationToken::new(),
        }
    }

    pub fn mode(&self) -> &IdentityMode {
        &self.mode
    }

    /// Token that cancels in-flight operations when the owner goes away
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn state(&self) -> MutexGuard<'_, FavoriteState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reload the favorite ids from the store
    pub async fn refresh(&self) -> Result<Vec<HymnId>, ReconcileError> {
        let ids = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ReconcileError::Cancelled),
            result = self.store.list() => result.map_err(ReconcileError::from_load)?,
        };

        let mut state = self.state();
        state.replace_ids(ids);
        debug!(count = state.ids().len(), store = self.store.name(), "Refreshed favorites");
        Ok(state.ids().to_vec())
    }

    pub fn is_favorited(&self, hymn_id: &HymnId) -> bool {
        self.state().contains(hymn_id)
    }

    pub fn favorites(&self) -> Vec<HymnId> {
        self.state().ids().to_vec()
    }

    /// Display favorites count of a hymn
    pub fn favorites_count(&self, hymn_id: &HymnId) -> u64 {
        self.state().count(hymn_id)
    }

    /// Seed the display count, typically from a fetched hymn record
    pub fn set_favorites_count(&self, hymn_id: &HymnId, count: u64) {
        self.state().set_count(hymn_id.clone(), count);
    }

    /// Flip the favorite flag of a hymn
    ///
    /// `currently_favorited` is the flag as the caller last saw it; the
    /// desired state is its negation.
    pub async fn toggle_favorite(
        &self,
        hymn_id: &HymnId,
        currently_favorited: bool,
    ) -> Result<FavoriteResult, ReconcileError> {
        if self.cancel.is_cancelled() {
            return Err(ReconcileError::Cancelled);
        }

        let mutation = if currently_favorited {
            Mutation::Remove(hymn_id.clone())
        } else {
            Mutation::Add(hymn_id.clone())
        };
        let undo = self.state().apply(&mutation);

        let write = async {
            match &mutation {
                Mutation::Add(id) => self.store.add(id).await,
                Mutation::Remove(id) => self.store.remove(id).await,
            }
        };

        // On cancellation the owner is gone: no rollback, no further updates
        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(hymn_id = %hymn_id, "Toggle cancelled");
                return Err(ReconcileError::Cancelled);
            }
            result = write => result,
        };

        let mut state = self.state();
        if result.is_ok() {
            // Local storage is the truth for anonymous visitors
            if let Some(ids) = self.store.snapshot() {
                state.replace_ids(ids);
            }
        }
        let outcome = match (&mutation, result) {
            (Mutation::Add(_), Ok(())) => ToggleOutcome::Added,
            (Mutation::Remove(_), Ok(())) => ToggleOutcome::Removed,
            (Mutation::Add(_), Err(FavoriteError::AlreadyExists)) => {
                state.revert_count(undo);
                ToggleOutcome::AlreadyFavorited
            }
            (Mutation::Remove(_), Err(FavoriteError::NotFound)) => {
                state.revert_count(undo);
                ToggleOutcome::NotFavorited
            }
            (_, Err(FavoriteError::Unauthenticated)) => {
                state.revert(undo);
                warn!(hymn_id = %hymn_id, "Session rejected, favorite change rolled back");
                return Err(ReconcileError::Unauthenticated);
            }
            (_, Err(source)) => {
                state.revert(undo);
                warn!(hymn_id = %hymn_id, "Favorite change rolled back: {}", source);
                return Err(ReconcileError::RemoteWriteFailed {
                    hymn_id: hymn_id.clone(),
                    source,
                });
            }
        };

        let result = FavoriteResult {
            hymn_id: hymn_id.clone(),
            favorited: state.contains(hymn_id),
            favorites_count: state.count(hymn_id),
            outcome,
        };
        info!(hymn_id = %hymn_id, ?outcome, store = self.store.name(), "Toggled favorite");
        Ok(result)
    }

    /// Remove every favorite
    ///
    /// Returns the ids that could not be removed; they stay in the state.
    pub async fn clear_all(&self) -> Result<Vec<HymnId>, ReconcileError> {
        let kept = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(ReconcileError::Cancelled),
            result = self.store.clear() => result.map_err(ReconcileError::from_load)?,
        };

        self.state().replace_ids(kept.clone());
        if kept.is_empty() {
            info!(store = self.store.name(), "Cleared all favorites");
        } else {
            warn!(store = self.store.name(), kept = kept.len(), "Some favorites could not be cleared");
        }
        Ok(kept)
    }
}
