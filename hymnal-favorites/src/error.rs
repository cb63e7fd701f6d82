//! Error types for favorites reconciliation
//!
//! `FavoriteError` is what a store reports; `ReconcileError` is what the
//! reconciler surfaces to the caller after rolling back.

use hymnal_common::HymnId;
use thiserror::Error;

/// Failure of a single favorite store operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FavoriteError {
    /// Session missing or rejected by the service (401)
    #[error("Authentication required")]
    Unauthenticated,

    /// Add of a hymn already in the set (409)
    #[error("Hymn already in favorites")]
    AlreadyExists,

    /// Remove of a hymn not in the set, or add of an unknown hymn (404)
    #[error("Not found")]
    NotFound,

    /// Request without a hymn id (400)
    #[error("Hymn ID is required")]
    MissingHymnId,

    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Parse error: {0}")]
    Parse(String),
}

impl FavoriteError {
    /// Conflicts mean the store already holds the desired state
    pub fn is_conflict(&self) -> bool {
        matches!(self, FavoriteError::AlreadyExists | FavoriteError::NotFound)
    }

    /// Failures that may succeed if retried unchanged
    pub fn is_transient(&self) -> bool {
        match self {
            FavoriteError::Network(_) | FavoriteError::Timeout => true,
            FavoriteError::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for FavoriteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FavoriteError::Timeout
        } else if err.is_decode() {
            FavoriteError::Parse(err.to_string())
        } else {
            FavoriteError::Network(err.to_string())
        }
    }
}

/// Failure of a reconciler operation, after any rollback has been applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconcileError {
    /// The remote write failed; the optimistic change was undone
    #[error("Failed to update favorite {hymn_id}: {source}")]
    RemoteWriteFailed {
        hymn_id: HymnId,
        #[source]
        source: FavoriteError,
    },

    /// The session is no longer valid; the optimistic change was undone
    #[error("Authentication required")]
    Unauthenticated,

    /// Reading the favorite set from its store failed
    #[error("Failed to load favorites: {0}")]
    LoadFailed(FavoriteError),

    /// The owning context went away before the operation finished
    #[error("Operation cancelled")]
    Cancelled,
}

impl ReconcileError {
    /// Message suitable for showing to the visitor
    pub fn user_message(&self) -> &'static str {
        match self {
            ReconcileError::RemoteWriteFailed { source, .. } if source.is_transient() => {
                "Could not reach the server. Your favorite was not saved, please try again."
            }
            ReconcileError::RemoteWriteFailed { .. } => {
                "Failed to update favorites. Please try again."
            }
            ReconcileError::Unauthenticated => "Please sign in again to update your favorites.",
            ReconcileError::LoadFailed(_) => "Could not load your favorites.",
            ReconcileError::Cancelled => "The request was cancelled.",
        }
    }

    pub(crate) fn from_load(err: FavoriteError) -> Self {
        match err {
            FavoriteError::Unauthenticated => ReconcileError::Unauthenticated,
            other => ReconcileError::LoadFailed(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_classification() {
        assert!(FavoriteError::AlreadyExists.is_conflict());
        assert!(FavoriteError::NotFound.is_conflict());
        assert!(!FavoriteError::Unauthenticated.is_conflict());
        assert!(!FavoriteError::Timeout.is_conflict());
    }

    #[test]
    fn test_transient_classification() {
        assert!(FavoriteError::Timeout.is_transient());
        assert!(FavoriteError::Network("reset".into()).is_transient());
        assert!(FavoriteError::Server { status: 503, message: String::new() }.is_transient());
        assert!(!FavoriteError::Server { status: 400, message: String::new() }.is_transient());
        assert!(!FavoriteError::Unauthenticated.is_transient());
    }

    #[test]
    fn test_user_messages_never_leak_internals() {
        let err = ReconcileError::RemoteWriteFailed {
            hymn_id: HymnId::new("h1").unwrap(),
            source: FavoriteError::Server { status: 500, message: "disk I/O error".into() },
        };
        assert!(!err.user_message().contains("disk"));
    }

    #[test]
    fn test_load_unauthenticated_maps_through() {
        assert_eq!(
            ReconcileError::from_load(FavoriteError::Unauthenticated),
            ReconcileError::Unauthenticated
        );
        assert!(matches!(
            ReconcileError::from_load(FavoriteError::Timeout),
            ReconcileError::LoadFailed(FavoriteError::Timeout)
        ));
    }
}
