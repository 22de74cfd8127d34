//! Headless row recycling and height virtualization for vertical collection views.
//!
//! For list/tree data controllers, selection handling and the view façade, see the
//! `collection-view` crate.
//!
//! This crate keeps a small, recycled set of row elements bound to the slice of a (possibly
//! huge) collection that intersects a viewport:
//! - [`FixedHeightController`]: every row shares one height, O(1) index/offset math.
//! - [`DynamicHeightController`]: rows report their height after layout; a prefix-sum cache
//!   keeps offset lookups logarithmic and an anchor keeps the view stable under corrections.
//!
//! It is UI-agnostic. The host provides:
//! - a row element type implementing [`ItemElement`]
//! - an [`ItemBinder`] that creates and binds elements for data indices
//! - viewport height, scroll offsets and (for dynamic heights) resolved row geometry
//! - a monotonic clock in milliseconds for deferred work, see [`DebouncedTask`]
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod debounce;
mod dynamic;
mod element;
mod error;
mod fenwick;
mod fixed;
mod height_cache;
mod key;
mod options;
mod pool;
mod selection;
mod state;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use controller::{VirtualizationController, create_controller};
pub use debounce::DebouncedTask;
pub use dynamic::DynamicHeightController;
pub use element::{ItemBinder, ItemElement};
pub use error::{CollectionError, Result};
pub use fixed::FixedHeightController;
pub use height_cache::HeightCache;
pub use key::{IdMap, IdSet};
pub use options::{
    DEFAULT_EXTRA_VISIBLE_ITEMS, DEFAULT_ITEM_HEIGHT, VirtualizationOptions, item_height_from_style,
};
pub use pool::{ItemPool, ReusableItem};
pub use selection::Selection;
pub use state::VirtualizationState;
pub use types::{
    ItemId, ResolvedRect, ScrollDirection, ScrollTarget, VirtualizationMethod, VisibleRange,
};
