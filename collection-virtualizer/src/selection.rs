use alloc::vec::Vec;

use crate::{IdMap, IdSet, ItemId};

/// Selected rows as parallel `(index, id)` lists in insertion order.
///
/// Ids are the source of truth: after a structural change, [`Selection::refresh`] recomputes
/// every index from its id and drops ids that no longer resolve.
#[derive(Clone, Debug, Default)]
pub struct Selection {
    indices: Vec<usize>,
    ids: Vec<ItemId>,
    id_set: IdSet,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn ids(&self) -> &[ItemId] {
        &self.ids
    }

    /// The first selected index, in insertion order.
    pub fn first_index(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    /// The most recently selected index.
    pub fn last_index(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    pub fn contains_id(&self, id: ItemId) -> bool {
        self.id_set.contains(&id)
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    /// Adds `(index, id)`. Returns `false` if `id` was already selected.
    pub fn add(&mut self, index: usize, id: ItemId) -> bool {
        if !self.id_set.insert(id) {
            return false;
        }
        self.indices.push(index);
        self.ids.push(id);
        true
    }

    pub fn remove_id(&mut self, id: ItemId) -> bool {
        if !self.id_set.remove(&id) {
            return false;
        }
        if let Some(pos) = self.ids.iter().position(|&x| x == id) {
            self.ids.remove(pos);
            self.indices.remove(pos);
        }
        true
    }

    pub fn remove_index(&mut self, index: usize) -> bool {
        let Some(pos) = self.indices.iter().position(|&x| x == index) else {
            return false;
        };
        let id = self.ids.remove(pos);
        self.indices.remove(pos);
        self.id_set.remove(&id);
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.ids.is_empty() {
            return false;
        }
        self.indices.clear();
        self.ids.clear();
        self.id_set.clear();
        true
    }

    /// Replaces the selection. Returns `true` if the resulting ids or indices differ.
    pub fn set(&mut self, entries: impl IntoIterator<Item = (usize, ItemId)>) -> bool {
        let prev_indices = core::mem::take(&mut self.indices);
        let prev_ids = core::mem::take(&mut self.ids);
        self.id_set.clear();
        for (index, id) in entries {
            self.add(index, id);
        }
        prev_indices != self.indices || prev_ids != self.ids
    }

    /// Recomputes indices from ids, dropping ids that `index_for_id` no longer resolves.
    ///
    /// Returns `true` if anything changed.
    pub fn refresh(&mut self, mut index_for_id: impl FnMut(ItemId) -> Option<usize>) -> bool {
        let mut changed = false;
        let mut kept = 0usize;
        for pos in 0..self.ids.len() {
            let id = self.ids[pos];
            match index_for_id(id) {
                Some(index) => {
                    if self.indices[pos] != index {
                        changed = true;
                    }
                    self.ids[kept] = id;
                    self.indices[kept] = index;
                    kept += 1;
                }
                None => {
                    self.id_set.remove(&id);
                    changed = true;
                }
            }
        }
        self.ids.truncate(kept);
        self.indices.truncate(kept);
        changed
    }

    /// [`Selection::refresh`] against a prebuilt id → index map.
    pub fn refresh_with_map(&mut self, map: &IdMap<usize>) -> bool {
        self.refresh(|id| map.get(&id).copied())
    }
}
