//! hymnal-favorites - favorite-set reconciliation
//!
//! Tracks which hymns a visitor has favorited. Anonymous visitors keep their
//! favorites in local storage; authenticated visitors keep them on the
//! favorites service. The [`FavoriteReconciler`] applies toggles
//! optimistically and undoes them when the service rejects the write.

pub mod config;
pub mod error;
mod http;
pub mod hymn_client;
pub mod identity;
pub mod local_store;
pub mod merge;
pub mod presentation;
pub mod reconciler;
pub mod remote_store;
pub mod state;
pub mod storage;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::{ClientConfig, ClientOverrides};
pub use error::{FavoriteError, ReconcileError};
pub use hymn_client::{HymnClient, HymnLookup};
pub use identity::IdentityMode;
pub use local_store::{LocalFavoriteStore, LOCAL_FAVORITES_KEY};
pub use merge::{merge_local_into_remote, MergeReport};
pub use presentation::{ErrorPlaceholder, FavoriteEntry, FavoritePresenter};
pub use reconciler::{FavoriteReconciler, FavoriteResult, ToggleOutcome};
pub use remote_store::RemoteFavoriteStore;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use store::FavoriteStore;
