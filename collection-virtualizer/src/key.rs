#[cfg(not(feature = "std"))]
use alloc::collections::{BTreeMap, BTreeSet};
#[cfg(feature = "std")]
use std::collections::{HashMap, HashSet};

use crate::ItemId;

/// Set of stable item ids.
///
/// Hash-based with `std`, ordered without it.
#[cfg(feature = "std")]
pub type IdSet = HashSet<ItemId>;
#[cfg(not(feature = "std"))]
pub type IdSet = BTreeSet<ItemId>;

/// Map keyed by stable item id.
#[cfg(feature = "std")]
pub type IdMap<V> = HashMap<ItemId, V>;
#[cfg(not(feature = "std"))]
pub type IdMap<V> = BTreeMap<ItemId, V>;
