use alloc::vec::Vec;

use crate::pool::{ItemPool, ReusableItem};
use crate::{ItemBinder, ItemElement};

/// Active rows in display order, backed by a pool.
///
/// Slot `i` shows data index `first_visible_index + i` (or is hidden past the end).
#[derive(Debug)]
pub(crate) struct ItemWindow<E> {
    pool: ItemPool<E>,
    active: Vec<ReusableItem<E>>,
}

impl<E> Default for ItemWindow<E> {
    fn default() -> Self {
        Self {
            pool: ItemPool::default(),
            active: Vec::new(),
        }
    }
}

impl<E: ItemElement> ItemWindow<E> {
    pub(crate) fn len(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn items(&self) -> &[ReusableItem<E>] {
        &self.active
    }

    pub(crate) fn created(&self) -> usize {
        self.pool.created()
    }

    pub(crate) fn find(&self, index: usize) -> Option<&ReusableItem<E>> {
        self.active.iter().find(|item| item.index() == Some(index))
    }

    pub(crate) fn find_mut(&mut self, index: usize) -> Option<&mut ReusableItem<E>> {
        self.active.iter_mut().find(|item| item.index() == Some(index))
    }

    pub(crate) fn slot_mut(&mut self, slot: usize) -> Option<&mut ReusableItem<E>> {
        self.active.get_mut(slot)
    }

    /// Appends a pooled row at the end of the window.
    pub(crate) fn push(&mut self, binder: &mut dyn ItemBinder<E>) {
        let item = self.pool.acquire(binder);
        self.active.push(item);
    }

    /// Releases rows from the end until at most `len` remain.
    pub(crate) fn truncate(&mut self, len: usize, binder: &mut dyn ItemBinder<E>) {
        while self.active.len() > len {
            if let Some(item) = self.active.pop() {
                self.pool.release(item, binder);
            }
        }
    }

    /// Grows or shrinks the window to exactly `len` rows.
    pub(crate) fn resize(&mut self, len: usize, binder: &mut dyn ItemBinder<E>) {
        self.truncate(len, binder);
        while self.active.len() < len {
            self.push(binder);
        }
    }

    /// Moves rows that scrolled out of one edge to the other edge instead of reallocating.
    pub(crate) fn cycle(&mut self, prev_first: usize, first: usize) {
        let len = self.active.len();
        if first > prev_first {
            let shift = first - prev_first;
            if shift < len {
                self.active.rotate_left(shift);
            }
        } else if prev_first > first {
            let shift = prev_first - first;
            if shift < len {
                self.active.rotate_right(shift);
            }
        }
    }

    /// Binds every slot to `first + slot`. Returns the number of bind callbacks that ran.
    pub(crate) fn setup_all(
        &mut self,
        first: usize,
        fixed_height: Option<u32>,
        binder: &mut dyn ItemBinder<E>,
    ) -> usize {
        let mut bound = 0;
        for (slot, item) in self.active.iter_mut().enumerate() {
            if item.setup(first + slot, fixed_height, binder) {
                bound += 1;
            }
        }
        bound
    }

    pub(crate) fn unbind_all(&mut self, binder: &mut dyn ItemBinder<E>) {
        for item in &mut self.active {
            item.unbind(binder);
        }
    }

    /// Marks the row bound to `index` (if any) as the drag ghost and clears every other row.
    pub(crate) fn mark_ghost(&mut self, index: Option<usize>) {
        for item in &mut self.active {
            let ghost = index.is_some() && item.index() == index;
            item.set_drag_ghost(ghost);
        }
    }

    /// Releases every active row and destroys the pool.
    pub(crate) fn destroy(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.truncate(0, binder);
        self.pool.destroy(binder);
    }
}
