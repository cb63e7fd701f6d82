//! Carrying anonymous favorites over to an account at login
//!
//! Union: every local id missing remotely is added. The local set is
//! cleared only when every id made it; ids that failed stay local so a
//! later login can try again.

use hymnal_common::HymnId;
use tracing::{info, warn};

use crate::error::FavoriteError;
use crate::local_store::LocalFavoriteStore;
use crate::store::FavoriteStore;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Newly added to the account
    pub added: Vec<HymnId>,
    /// Already on the account (including 409 on add)
    pub already_present: Vec<HymnId>,
    /// Left in local storage
    pub failed: Vec<(HymnId, FavoriteError)>,
    pub local_cleared: bool,
}

impl MergeReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Merge the local favorite set into the remote one
///
/// An `Unauthenticated` response aborts the merge and leaves local storage
/// untouched.
pub async fn merge_local_into_remote(
    local: &LocalFavoriteStore,
    remote: &dyn FavoriteStore,
) -> Result<MergeReport, FavoriteError> {
    let local_ids = local.load();
    let mut report = MergeReport::default();
    if local_ids.is_empty() {
        return Ok(report);
    }

    let remote_ids = remote.list().await?;

    for hymn_id in local_ids {
        if remote_ids.contains(&hymn_id) {
            report.already_present.push(hymn_id);
            continue;
        }

        match remote.add(&hymn_id).await {
            Ok(()) => report.added.push(hymn_id),
            Err(FavoriteError::AlreadyExists) => report.already_present.push(hymn_id),
            Err(FavoriteError::Unauthenticated) => return Err(FavoriteError::Unauthenticated),
            Err(e) => {
                warn!(hymn_id = %hymn_id, "Failed to merge favorite: {}", e);
                report.failed.push((hymn_id, e));
            }
        }
    }

    if report.is_complete() {
        match local.clear() {
            Ok(()) => report.local_cleared = true,
            Err(e) => warn!("Merged favorites but could not clear local storage: {}", e),
        }
    } else {
        let remaining: Vec<HymnId> = report.failed.iter().map(|(id, _)| id.clone()).collect();
        if let Err(e) = local.save(&remaining) {
            warn!("Failed to keep unmerged favorites locally: {}", e);
        }
    }

    info!(
        added = report.added.len(),
        already_present = report.already_present.len(),
        failed = report.failed.len(),
        "Merged local favorites into account"
    );
    Ok(report)
}
