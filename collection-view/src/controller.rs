use alloc::vec::Vec;

use collection_virtualizer::{ItemId, Result};

/// What an [`ItemFactory`](crate::ItemFactory) gets to know about the row it binds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BindContext {
    pub index: usize,
    pub id: ItemId,
    /// Nesting level; always 0 in a list.
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
    pub selected: bool,
}

/// Receives structural notifications from a view controller as it mutates its data.
///
/// `items_removed` runs before the items are gone, so listeners can still resolve the old
/// indices. Every mutation ends with `items_source_size_changed`.
pub trait CollectionListener {
    /// Items now live at `indices` (ascending).
    fn items_added(&mut self, indices: &[usize]) {
        let _ = indices;
    }

    /// The items at `indices` (ascending) are about to be removed.
    fn items_removed(&mut self, indices: &[usize]) {
        let _ = indices;
    }

    fn item_index_changed(&mut self, from: usize, to: usize) {
        let _ = (from, to);
    }

    /// Every index was reassigned at once.
    fn items_reset(&mut self) {}

    fn item_expanded_changed(&mut self, id: ItemId, expanded: bool) {
        let _ = (id, expanded);
    }

    fn items_source_size_changed(&mut self) {}
}

impl CollectionListener for () {}

/// The data side of a collection view: a flat, indexed sequence of items with stable ids.
///
/// Lists map indices straight onto their items source; trees map them onto the flattened
/// list of visible nodes.
pub trait CollectionViewController {
    type Item;

    fn item_count(&self) -> usize;

    fn item(&self, index: usize) -> Option<&Self::Item>;

    fn id_for_index(&self, index: usize) -> Option<ItemId>;

    fn index_for_id(&self, id: ItemId) -> Option<usize>;

    /// `false` while there is no data to show (e.g. no items source).
    fn has_valid_data(&self) -> bool {
        true
    }

    fn bind_context(&self, index: usize) -> BindContext {
        BindContext {
            index,
            id: self.id_for_index(index).unwrap_or(index as ItemId),
            ..BindContext::default()
        }
    }

    /// Moves the item at `from` to `to`, as the result of a drag reorder.
    fn reorder_item(
        &mut self,
        from: usize,
        to: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()>;

    fn expanded_ids(&self) -> Vec<ItemId> {
        Vec::new()
    }

    fn restore_expanded_ids(&mut self, ids: &[ItemId], listener: &mut dyn CollectionListener) {
        let _ = (ids, listener);
    }
}
