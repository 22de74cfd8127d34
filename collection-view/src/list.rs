use alloc::vec::Vec;

use collection_virtualizer::{CollectionError, ItemId, Result};

use crate::{CollectionListener, CollectionViewController, ItemsSource};

/// View controller over a flat [`ItemsSource`].
///
/// Without a source the controller reports no items and every mutation is a no-op.
#[derive(Clone, Debug)]
pub struct ListViewController<S> {
    source: Option<S>,
}

impl<S> Default for ListViewController<S> {
    fn default() -> Self {
        Self { source: None }
    }
}

impl<S: ItemsSource> ListViewController<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Some(source),
        }
    }

    pub fn source(&self) -> Option<&S> {
        self.source.as_ref()
    }

    /// Direct access to the source. Changes made through it are not announced; follow up with
    /// a refresh of the view.
    pub fn source_mut(&mut self) -> Option<&mut S> {
        self.source.as_mut()
    }

    /// Replaces the source (or removes it with `None`), returning the previous one.
    pub fn set_source(
        &mut self,
        source: Option<S>,
        listener: &mut dyn CollectionListener,
    ) -> Option<S> {
        let prev = core::mem::replace(&mut self.source, source);
        listener.items_reset();
        listener.items_source_size_changed();
        prev
    }

    /// Appends `count` default items.
    pub fn add_items(&mut self, count: usize, listener: &mut dyn CollectionListener) -> Result<()> {
        let Some(source) = self.source.as_ref() else {
            return Ok(());
        };
        let len = source.len();
        self.insert_items(len, count, listener)
    }

    /// Inserts `count` default items before `index`.
    pub fn insert_items(
        &mut self,
        index: usize,
        count: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        let len = source.len();
        if index > len {
            return Err(CollectionError::IndexOutOfRange { index, count: len });
        }
        if count == 0 {
            return Ok(());
        }

        if source.is_fixed_size() {
            let layout: Vec<Option<usize>> = (0..index)
                .map(Some)
                .chain(core::iter::repeat_n(None, count))
                .chain((index..len).map(Some))
                .collect();
            source.rebuild(&layout)?;
        } else if index == len {
            for _ in 0..count {
                source.push_default()?;
            }
        } else {
            for _ in 0..count {
                source.insert_default(index)?;
            }
        }

        vdebug!(index, count, "ListViewController: items added");
        let added: Vec<usize> = (index..index + count).collect();
        listener.items_added(&added);
        listener.items_source_size_changed();
        Ok(())
    }

    /// Removes the items at `indices`, given in any order.
    ///
    /// Indices refer to positions before the removal; duplicates are ignored.
    pub fn remove_items(
        &mut self,
        indices: &[usize],
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        let len = source.len();
        let mut sorted = indices.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.len() > len {
            return Err(CollectionError::RemoveExceedsCount {
                requested: sorted.len(),
                count: len,
            });
        }
        if let Some(&index) = sorted.last().filter(|&&i| i >= len) {
            return Err(CollectionError::IndexOutOfRange { index, count: len });
        }
        if sorted.is_empty() {
            return Ok(());
        }

        listener.items_removed(&sorted);
        if source.is_fixed_size() {
            let layout: Vec<Option<usize>> = (0..len)
                .filter(|i| sorted.binary_search(i).is_err())
                .map(Some)
                .collect();
            source.rebuild(&layout)?;
        } else {
            // Highest first, so earlier removals never shift later targets.
            for &index in sorted.iter().rev() {
                source.remove_at(index)?;
            }
        }

        vdebug!(count = sorted.len(), "ListViewController: items removed");
        listener.items_source_size_changed();
        Ok(())
    }

    pub fn remove_item(
        &mut self,
        index: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        self.remove_items(&[index], listener)
    }

    pub fn move_item(
        &mut self,
        from: usize,
        to: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        if from == to {
            let count = source.len();
            if from >= count {
                return Err(CollectionError::IndexOutOfRange { index: from, count });
            }
            return Ok(());
        }
        source.move_item(from, to)?;
        vdebug!(from, to, "ListViewController: item moved");
        listener.item_index_changed(from, to);
        listener.items_source_size_changed();
        Ok(())
    }

    pub fn clear_items(&mut self, listener: &mut dyn CollectionListener) -> Result<()> {
        let Some(source) = self.source.as_mut() else {
            return Ok(());
        };
        let len = source.len();
        if len == 0 {
            return Ok(());
        }
        let all: Vec<usize> = (0..len).collect();
        listener.items_removed(&all);
        if source.is_fixed_size() {
            source.rebuild(&[])?;
        } else {
            source.clear()?;
        }
        listener.items_source_size_changed();
        Ok(())
    }
}

impl<S: ItemsSource> CollectionViewController for ListViewController<S> {
    type Item = S::Item;

    fn item_count(&self) -> usize {
        self.source.as_ref().map_or(0, |s| s.len())
    }

    fn item(&self, index: usize) -> Option<&S::Item> {
        self.source.as_ref()?.get(index)
    }

    fn id_for_index(&self, index: usize) -> Option<ItemId> {
        let source = self.source.as_ref()?;
        (index < source.len()).then(|| source.item_id(index))
    }

    fn index_for_id(&self, id: ItemId) -> Option<usize> {
        self.source.as_ref()?.index_of_id(id)
    }

    fn has_valid_data(&self) -> bool {
        self.source.is_some()
    }

    fn reorder_item(
        &mut self,
        from: usize,
        to: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        self.move_item(from, to, listener)
    }
}
