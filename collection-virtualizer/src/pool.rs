use alloc::vec::Vec;

use crate::{ItemBinder, ItemElement, ItemId};

/// A pooled row: one visual element, bound to at most one data index at a time.
///
/// The element is created once and never replaced; only its binding changes.
#[derive(Debug)]
pub struct ReusableItem<E> {
    index: Option<usize>,
    id: Option<ItemId>,
    element: E,
    is_drag_ghost: bool,
}

impl<E> ReusableItem<E> {
    fn new(element: E) -> Self {
        Self {
            index: None,
            id: None,
            element,
            is_drag_ghost: false,
        }
    }

    /// Bound data index; `None` while hidden or unbound.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn id(&self) -> Option<ItemId> {
        self.id
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    pub fn is_drag_ghost(&self) -> bool {
        self.is_drag_ghost
    }

    pub fn is_bound(&self) -> bool {
        self.index.is_some()
    }
}

impl<E: ItemElement> ReusableItem<E> {
    /// Binds the row to `index`, or hides it when `index` is past the end of the collection.
    ///
    /// Returns `true` when a bind callback ran.
    pub(crate) fn setup(
        &mut self,
        index: usize,
        fixed_height: Option<u32>,
        binder: &mut dyn ItemBinder<E>,
    ) -> bool {
        if index >= binder.item_count() {
            self.hide(binder);
            return false;
        }
        self.element.set_visible(true);
        let id = binder.item_id(index);
        if self.index == Some(index) && self.id == Some(id) {
            return false;
        }
        self.unbind(binder);
        self.index = Some(index);
        self.id = Some(id);
        self.element.set_fixed_height(fixed_height);
        binder.bind_item(&mut self.element, index);
        true
    }

    pub(crate) fn unbind(&mut self, binder: &mut dyn ItemBinder<E>) {
        if let Some(old) = self.index.take() {
            binder.unbind_item(&mut self.element, old);
        }
        self.id = None;
    }

    pub(crate) fn hide(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.unbind(binder);
        self.set_drag_ghost(false);
        self.element.set_visible(false);
    }

    pub(crate) fn set_drag_ghost(&mut self, ghost: bool) {
        if self.is_drag_ghost == ghost {
            return;
        }
        self.is_drag_ghost = ghost;
        self.element.set_drag_ghost(ghost);
    }
}

/// Recycler for row elements.
///
/// Released rows keep their element alive so the next `acquire` can reuse it immediately.
#[derive(Debug)]
pub struct ItemPool<E> {
    free: Vec<ReusableItem<E>>,
    created: usize,
}

impl<E> Default for ItemPool<E> {
    fn default() -> Self {
        Self {
            free: Vec::new(),
            created: 0,
        }
    }
}

impl<E: ItemElement> ItemPool<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of elements currently instantiated (active + pooled).
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// Gets a recycled row or constructs one, and prepares it for attachment.
    pub fn acquire(&mut self, binder: &mut dyn ItemBinder<E>) -> ReusableItem<E> {
        let mut item = match self.free.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                vtrace!(created = self.created, "ItemPool: make_item");
                ReusableItem::new(binder.make_item())
            }
        };
        item.element.pre_attach();
        item
    }

    /// Unbinds and detaches `item`, keeping its element for reuse.
    pub fn release(&mut self, mut item: ReusableItem<E>, binder: &mut dyn ItemBinder<E>) {
        item.hide(binder);
        item.element.detach();
        self.free.push(item);
    }

    /// Destroys every pooled (released) element.
    pub fn destroy(&mut self, binder: &mut dyn ItemBinder<E>) {
        vdebug!(count = self.free.len(), "ItemPool: destroy");
        for item in self.free.drain(..) {
            binder.destroy_item(item.element);
            self.created -= 1;
        }
    }
}
