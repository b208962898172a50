//! Sparse storage for cold unit attributes.

use indexmap::IndexMap;
use skirmish_core::ColdData;

/// Cold attributes keyed by slot.
///
/// Only occupied slots have an entry. Iteration follows insertion order,
/// which keeps anything derived from it deterministic.
#[derive(Clone, Debug, Default)]
pub struct ColdStore {
    entries: IndexMap<usize, ColdData>,
}

impl ColdStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cold data of a slot.
    pub fn get(&self, index: usize) -> Option<&ColdData> {
        self.entries.get(&index)
    }

    /// Mutable cold data of a slot.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut ColdData> {
        self.entries.get_mut(&index)
    }

    /// Store cold data for a slot, replacing any previous entry.
    pub fn insert(&mut self, index: usize, data: ColdData) {
        self.entries.insert(index, data);
    }

    /// Drop a slot's entry.
    pub fn remove(&mut self, index: usize) -> Option<ColdData> {
        self.entries.shift_remove(&index)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
