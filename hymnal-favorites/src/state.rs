//! In-memory favorite state of a reconciler
//!
//! Mutations return an `Undo` that applies the inverse change rather than
//! restoring a snapshot, so rolling back one toggle leaves a concurrent
//! toggle of another hymn intact.

use std::collections::HashMap;

use hymnal_common::HymnId;

/// Optimistic change to the favorite set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Add(HymnId),
    Remove(HymnId),
}

impl Mutation {
    pub fn hymn_id(&self) -> &HymnId {
        match self {
            Mutation::Add(id) | Mutation::Remove(id) => id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Membership {
    Unchanged,
    Inserted,
    Removed { index: usize },
}

/// Inverse of one applied mutation
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "an unused Undo cannot roll the mutation back"]
pub struct Undo {
    hymn_id: HymnId,
    membership: Membership,
    count_delta: i8,
}

/// Ordered favorite ids plus a display favorites count per hymn
///
/// Counts are kept signed so that undoing overlapping toggles of one hymn
/// always cancels out exactly; the floor at zero is applied on read.
#[derive(Debug, Clone, Default)]
pub struct FavoriteState {
    ids: Vec<HymnId>,
    counts: HashMap<HymnId, i64>,
}

impl FavoriteState {
    pub fn new(ids: Vec<HymnId>) -> Self {
        let mut state = Self::default();
        state.replace_ids(ids);
        state
    }

    pub fn ids(&self) -> &[HymnId] {
        &self.ids
    }

    pub fn contains(&self, hymn_id: &HymnId) -> bool {
        self.ids.contains(hymn_id)
    }

    pub fn count(&self, hymn_id: &HymnId) -> u64 {
        let count = self.counts.get(hymn_id).copied().unwrap_or(0);
        u64::try_from(count).unwrap_or(0)
    }

    pub fn set_count(&mut self, hymn_id: HymnId, count: u64) {
        self.counts.insert(hymn_id, i64::try_from(count).unwrap_or(i64::MAX));
    }

    /// Replace the id sequence (duplicates dropped), keeping display counts
    pub fn replace_ids(&mut self, ids: Vec<HymnId>) {
        self.ids.clear();
        for id in ids {
            if !self.ids.contains(&id) {
                self.ids.push(id);
            }
        }
    }

    /// Apply a mutation and adjust the display count (+1 / -1, floored at 0)
    pub fn apply(&mut self, mutation: &Mutation) -> Undo {
        match mutation {
            Mutation::Add(id) => {
                let membership = if self.contains(id) {
                    Membership::Unchanged
                } else {
                    self.ids.push(id.clone());
                    Membership::Inserted
                };
                *self.counts.entry(id.clone()).or_insert(0) += 1;
                Undo {
                    hymn_id: id.clone(),
                    membership,
                    count_delta: 1,
                }
            }
            Mutation::Remove(id) => {
                let membership = match self.ids.iter().position(|x| x == id) {
                    Some(index) => {
                        self.ids.remove(index);
                        Membership::Removed { index }
                    }
                    None => Membership::Unchanged,
                };
                let count = self.counts.entry(id.clone()).or_insert(0);
                // Only a visible count is decremented
                let count_delta = if *count > 0 {
                    *count -= 1;
                    -1
                } else {
                    0
                };
                Undo {
                    hymn_id: id.clone(),
                    membership,
                    count_delta,
                }
            }
        }
    }

    /// Undo both the membership change and the count change
    pub fn revert(&mut self, undo: Undo) {
        match undo.membership {
            Membership::Unchanged => {}
            Membership::Inserted => self.ids.retain(|id| id != &undo.hymn_id),
            Membership::Removed { index } => {
                if !self.contains(&undo.hymn_id) {
                    let index = index.min(self.ids.len());
                    self.ids.insert(index, undo.hymn_id.clone());
                }
            }
        }
        self.revert_count(undo);
    }

    /// Undo only the count change, keeping the membership change
    pub fn revert_count(&mut self, undo: Undo) {
        let delta = i64::from(undo.count_delta);
        *self.counts.entry(undo.hymn_id).or_insert(0) -= delta;
    }
}
