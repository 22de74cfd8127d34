use crate::ItemId;

/// Errors raised synchronously by invalid operations.
///
/// These are programmer errors (bad indices, bad configuration); transient states such as a
/// missing items source are not errors and turn operations into no-ops instead.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum CollectionError {
    #[error("item height must be a positive, finite value (got {0})")]
    InvalidItemHeight(f32),
    #[error("index {index} is out of range for a collection of {count} items")]
    IndexOutOfRange { index: usize, count: usize },
    #[error("cannot remove {requested} items from a collection of {count} items")]
    RemoveExceedsCount { requested: usize, count: usize },
    #[error("the items source has a fixed size and cannot be resized")]
    FixedSize,
    #[error("no item with id {0}")]
    UnknownItemId(ItemId),
    #[error("item id {0} is already in use")]
    DuplicateItemId(ItemId),
    #[error("item {id} cannot be moved under its own descendant {parent}")]
    CyclicMove { id: ItemId, parent: ItemId },
}

pub type Result<T, E = CollectionError> = core::result::Result<T, E>;
