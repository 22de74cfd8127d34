use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use collection_virtualizer::{ItemId, VirtualizationState};

/// View state that survives the view being torn down and rebuilt.
///
/// With `feature = "serde"`, this type implements `Serialize`/`Deserialize`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PersistedViewState {
    pub virtualization: VirtualizationState,
    pub selected_ids: Vec<ItemId>,
    pub expanded_ids: Vec<ItemId>,
}

/// Host storage for persisted view state, keyed by the view-data key.
pub trait ViewDataStore {
    fn load(&self, key: &str) -> Option<PersistedViewState>;

    fn store(&mut self, key: &str, state: PersistedViewState);
}

#[derive(Clone, Debug, Default)]
pub struct MemoryViewDataStore {
    entries: BTreeMap<String, PersistedViewState>,
}

impl MemoryViewDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn remove(&mut self, key: &str) -> Option<PersistedViewState> {
        self.entries.remove(key)
    }
}

impl ViewDataStore for MemoryViewDataStore {
    fn load(&self, key: &str) -> Option<PersistedViewState> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, state: PersistedViewState) {
        self.entries.insert(String::from(key), state);
    }
}
