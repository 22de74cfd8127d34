use alloc::boxed::Box;
use alloc::vec::Vec;

use collection_virtualizer::{CollectionError, ItemId, Result};

/// The mutable backing collection of a list view.
///
/// Positions are plain indices. [`ItemsSource::item_id`] is what selection and persistence key
/// on; stores without stable identities fall back to the index.
pub trait ItemsSource {
    type Item;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Option<&Self::Item>;

    fn item_id(&self, index: usize) -> ItemId {
        index as ItemId
    }

    fn index_of_id(&self, id: ItemId) -> Option<usize> {
        (0..self.len()).find(|&i| self.item_id(i) == id)
    }

    /// Fixed-size stores cannot grow or shrink in place; they are rebuilt instead.
    fn is_fixed_size(&self) -> bool {
        false
    }

    fn push_default(&mut self) -> Result<()>;

    fn insert_default(&mut self, index: usize) -> Result<()>;

    fn remove_at(&mut self, index: usize) -> Result<()>;

    fn clear(&mut self) -> Result<()>;

    /// Moves the item at `from` so that it ends up at `to`.
    fn move_item(&mut self, from: usize, to: usize) -> Result<()>;

    /// Replaces the store with a new one laid out by `layout`: `Some(i)` keeps the current
    /// item `i`, `None` creates a default item.
    fn rebuild(&mut self, layout: &[Option<usize>]) -> Result<()> {
        let _ = layout;
        Err(CollectionError::FixedSize)
    }
}

fn check_index(index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(CollectionError::IndexOutOfRange { index, count });
    }
    Ok(())
}

fn check_move(from: usize, to: usize, count: usize) -> Result<()> {
    check_index(from, count)?;
    check_index(to, count)
}

fn rebuild_from<T: Default>(old: Vec<T>, layout: &[Option<usize>]) -> Result<Vec<T>> {
    let count = old.len();
    let mut old: Vec<Option<T>> = old.into_iter().map(Some).collect();
    layout
        .iter()
        .map(|slot| match *slot {
            None => Ok(T::default()),
            Some(index) => old
                .get_mut(index)
                .and_then(Option::take)
                .ok_or(CollectionError::IndexOutOfRange { index, count }),
        })
        .collect()
}

impl<T: Default> ItemsSource for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    fn index_of_id(&self, id: ItemId) -> Option<usize> {
        let index = usize::try_from(id).ok()?;
        (index < <[T]>::len(self)).then_some(index)
    }

    fn push_default(&mut self) -> Result<()> {
        self.push(T::default());
        Ok(())
    }

    fn insert_default(&mut self, index: usize) -> Result<()> {
        if index > <[T]>::len(self) {
            return Err(CollectionError::IndexOutOfRange {
                index,
                count: <[T]>::len(self),
            });
        }
        self.insert(index, T::default());
        Ok(())
    }

    fn remove_at(&mut self, index: usize) -> Result<()> {
        check_index(index, <[T]>::len(self))?;
        self.remove(index);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Vec::clear(self);
        Ok(())
    }

    fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        check_move(from, to, <[T]>::len(self))?;
        let item = self.remove(from);
        self.insert(to, item);
        Ok(())
    }

    fn rebuild(&mut self, layout: &[Option<usize>]) -> Result<()> {
        *self = rebuild_from(core::mem::take(self), layout)?;
        Ok(())
    }
}

/// A boxed slice is the fixed-size store: every size change goes through `rebuild`.
impl<T: Default> ItemsSource for Box<[T]> {
    type Item = T;

    fn len(&self) -> usize {
        <[T]>::len(self)
    }

    fn get(&self, index: usize) -> Option<&T> {
        <[T]>::get(self, index)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn push_default(&mut self) -> Result<()> {
        Err(CollectionError::FixedSize)
    }

    fn insert_default(&mut self, _index: usize) -> Result<()> {
        Err(CollectionError::FixedSize)
    }

    fn remove_at(&mut self, _index: usize) -> Result<()> {
        Err(CollectionError::FixedSize)
    }

    fn clear(&mut self) -> Result<()> {
        Err(CollectionError::FixedSize)
    }

    fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        check_move(from, to, <[T]>::len(self))?;
        if from < to {
            self[from..=to].rotate_left(1);
        } else {
            self[to..=from].rotate_right(1);
        }
        Ok(())
    }

    fn rebuild(&mut self, layout: &[Option<usize>]) -> Result<()> {
        let old = core::mem::take(self).into_vec();
        *self = rebuild_from(old, layout)?.into_boxed_slice();
        Ok(())
    }
}

/// A growable store that hands out a stable id to every item it creates.
///
/// Ids follow items across inserts, removals and moves, so selection survives index shifts.
#[derive(Clone, Debug)]
pub struct IdentifiedVec<T> {
    entries: Vec<(ItemId, T)>,
    next_id: ItemId,
}

impl<T> Default for IdentifiedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdentifiedVec<T> {
    pub fn new() -> Self {
        Self::with_first_id(0)
    }

    pub fn with_first_id(first_id: ItemId) -> Self {
        Self {
            entries: Vec::new(),
            next_id: first_id,
        }
    }

    /// Appends `item`, returning its id.
    pub fn push(&mut self, item: T) -> ItemId {
        let id = self.allocate_id();
        self.entries.push((id, item));
        id
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<ItemId> {
        if index > self.entries.len() {
            return Err(CollectionError::IndexOutOfRange {
                index,
                count: self.entries.len(),
            });
        }
        let id = self.allocate_id();
        self.entries.insert(index, (id, item));
        Ok(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.entries.iter().map(|(id, _)| *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.entries.iter().map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|(_, item)| item)
    }

    fn allocate_id(&mut self) -> ItemId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl<T> FromIterator<T> for IdentifiedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vec = Self::new();
        for item in iter {
            vec.push(item);
        }
        vec
    }
}

impl<T: Default> ItemsSource for IdentifiedVec<T> {
    type Item = T;

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn get(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, item)| item)
    }

    fn item_id(&self, index: usize) -> ItemId {
        self.entries.get(index).map_or(index as ItemId, |(id, _)| *id)
    }

    fn index_of_id(&self, id: ItemId) -> Option<usize> {
        self.entries.iter().position(|(x, _)| *x == id)
    }

    fn push_default(&mut self) -> Result<()> {
        self.push(T::default());
        Ok(())
    }

    fn insert_default(&mut self, index: usize) -> Result<()> {
        self.insert(index, T::default()).map(|_| ())
    }

    fn remove_at(&mut self, index: usize) -> Result<()> {
        check_index(index, self.entries.len())?;
        self.entries.remove(index);
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.entries.clear();
        Ok(())
    }

    fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        check_move(from, to, self.entries.len())?;
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        Ok(())
    }
}
