//! Test doubles for the store and lookup seams

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use hymnal_common::{Hymn, HymnId};

use crate::error::FavoriteError;
use crate::hymn_client::HymnLookup;
use crate::store::FavoriteStore;

/// In-memory store with server semantics (409 on duplicate add, 404 on
/// missing remove) and scriptable failures
#[derive(Default)]
pub struct FakeRemoteStore {
    ids: Mutex<Vec<HymnId>>,
    fail_next: Mutex<Option<FavoriteError>>,
    fail_on: Mutex<HashMap<HymnId, FavoriteError>>,
    hang_writes: Mutex<bool>,
}

impl FakeRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(raw: &[&str]) -> Self {
        let store = Self::new();
        *store.ids.lock().unwrap() = raw.iter().map(|id| HymnId::new(*id).unwrap()).collect();
        store
    }

    pub fn ids(&self) -> Vec<HymnId> {
        self.ids.lock().unwrap().clone()
    }

    /// Fail the next operation of any kind
    pub fn fail_next(&self, err: FavoriteError) {
        *self.fail_next.lock().unwrap() = Some(err);
    }

    /// Fail every write touching this id
    pub fn fail_on(&self, hymn_id: HymnId, err: FavoriteError) {
        self.fail_on.lock().unwrap().insert(hymn_id, err);
    }

    /// Make writes never complete
    pub fn hang_writes(&self) {
        *self.hang_writes.lock().unwrap() = true;
    }

    fn scripted_failure(&self, hymn_id: Option<&HymnId>) -> Result<(), FavoriteError> {
        if let Some(err) = self.fail_next.lock().unwrap_or_else(PoisonError::into_inner).take() {
            return Err(err);
        }
        if let Some(id) = hymn_id {
            if let Some(err) = self.fail_on.lock().unwrap().get(id) {
                return Err(err.clone());
            }
        }
        Ok(())
    }

    async fn maybe_hang(&self) {
        let hang = *self.hang_writes.lock().unwrap();
        if hang {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl FavoriteStore for FakeRemoteStore {
    fn name(&self) -> &'static str {
        "fake-remote"
    }

    async fn list(&self) -> Result<Vec<HymnId>, FavoriteError> {
        self.scripted_failure(None)?;
        Ok(self.ids())
    }

    async fn add(&self, hymn_id: &HymnId) -> Result<(), FavoriteError> {
        self.maybe_hang().await;
        self.scripted_failure(Some(hymn_id))?;
        let mut ids = self.ids.lock().unwrap();
        if ids.contains(hymn_id) {
            return Err(FavoriteError::AlreadyExists);
        }
        ids.push(hymn_id.clone());
        Ok(())
    }

    async fn remove(&self, hymn_id: &HymnId) -> Result<(), FavoriteError> {
        self.maybe_hang().await;
        self.scripted_failure(Some(hymn_id))?;
        let mut ids = self.ids.lock().unwrap();
        let before = ids.len();
        ids.retain(|id| id != hymn_id);
        if ids.len() == before {
            return Err(FavoriteError::NotFound);
        }
        Ok(())
    }
}

/// Lookup over a fixed set of hymns; anything else is `NotFound`
#[derive(Default)]
pub struct FakeHymnLookup {
    hymns: HashMap<HymnId, Hymn>,
}

impl FakeHymnLookup {
    pub fn with_hymns(hymns: &[(&str, &str, &str)]) -> Self {
        let hymns = hymns
            .iter()
            .map(|(id, title, author)| {
                let hymn = Hymn {
                    id: HymnId::new(*id).unwrap(),
                    title: title.to_string(),
                    author: author.to_string(),
                    lyrics: format!("{}\nsecond line", title),
                    hymn_number: None,
                    category: None,
                    tags: Vec::new(),
                    language: "English".to_string(),
                    favorites_count: 0,
                    created_at: None,
                };
                (hymn.id.clone(), hymn)
            })
            .collect();
        Self { hymns }
    }
}

#[async_trait]
impl HymnLookup for FakeHymnLookup {
    async fn fetch_hymn(&self, hymn_id: &HymnId) -> Result<Hymn, FavoriteError> {
        // Resolve out of order to exercise the join
        tokio::task::yield_now().await;
        self.hymns.get(hymn_id).cloned().ok_or(FavoriteError::NotFound)
    }
}
