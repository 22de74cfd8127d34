use alloc::vec::Vec;

use collection_virtualizer::ItemId;

/// Notifications queued by a view, drained with
/// [`CollectionView::take_events`](crate::CollectionView::take_events).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectionViewEvent {
    /// The selection changed; indices and ids in selection order.
    SelectionChanged {
        indices: Vec<usize>,
        ids: Vec<ItemId>,
    },
    /// Double click or submit on the current selection.
    ItemsChosen(Vec<ItemId>),
    ItemsAdded(Vec<usize>),
    /// Indices as they were before the removal.
    ItemsRemoved(Vec<usize>),
    ItemIndexChanged {
        from: usize,
        to: usize,
    },
    ItemExpandedChanged {
        id: ItemId,
        expanded: bool,
    },
    /// The items source was replaced or re-laid out as a whole.
    ItemsSourceChanged,
}
