use alloc::vec::Vec;

use crate::fenwick::Fenwick;

/// Per-index item heights plus a cumulative index over them.
///
/// Unmeasured indices report the default expected height. One index may be *excluded*
/// (the row being drag-reordered): it keeps its cached height but contributes zero to every
/// cumulative query until the exclusion is lifted.
#[derive(Clone, Debug)]
pub struct HeightCache {
    default_height: u32,
    sizes: Vec<u32>,
    measured: Vec<bool>,
    sums: Fenwick,
    excluded: Option<usize>,
    min_measured: Option<u32>,
}

impl HeightCache {
    pub fn new(count: usize, default_height: u32) -> Self {
        let sizes = alloc::vec![default_height; count];
        Self {
            default_height,
            sums: Fenwick::from_sizes(sizes.iter().copied()),
            measured: alloc::vec![false; count],
            sizes,
            excluded: None,
            min_measured: None,
        }
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn default_height(&self) -> u32 {
        self.default_height
    }

    /// Changes the estimate used for unmeasured indices.
    pub fn set_default_height(&mut self, height: u32) {
        if self.default_height == height {
            return;
        }
        self.default_height = height;
        for (size, measured) in self.sizes.iter_mut().zip(&self.measured) {
            if !*measured {
                *size = height;
            }
        }
        self.rebuild_sums();
    }

    /// Smallest height a row is expected to have; bounds how many rows can cover a viewport.
    pub fn min_item_height(&self) -> u32 {
        match self.min_measured {
            Some(min) => min.min(self.default_height),
            None => self.default_height,
        }
        .max(1)
    }

    pub fn measured_count(&self) -> usize {
        self.measured.iter().filter(|m| **m).count()
    }

    pub fn is_measured(&self, index: usize) -> bool {
        self.measured.get(index).copied().unwrap_or(false)
    }

    /// Cached height of `index` (measured or default), ignoring drag exclusion.
    pub fn height(&self, index: usize) -> Option<u32> {
        self.sizes.get(index).copied()
    }

    /// Height `index` currently occupies in the content.
    pub fn effective_height(&self, index: usize) -> u32 {
        if self.excluded == Some(index) {
            return 0;
        }
        self.sizes.get(index).copied().unwrap_or(0)
    }

    /// Records a measurement. Returns the change in content height.
    pub fn register(&mut self, index: usize, height: u32) -> i64 {
        if index >= self.sizes.len() {
            return 0;
        }
        self.measured[index] = true;
        self.min_measured = Some(match self.min_measured {
            Some(min) => min.min(height),
            None => height,
        });

        let cur = self.sizes[index];
        if cur == height {
            return 0;
        }
        self.sizes[index] = height;
        let delta = height as i64 - cur as i64;
        if self.excluded != Some(index) {
            self.sums.add(index, delta);
        }
        delta
    }

    /// Total height of the items `[0, index]`.
    pub fn content_height_for_index(&self, index: usize) -> u64 {
        self.sums.prefix_sum(index.saturating_add(1))
    }

    /// Offset of the top edge of `index`.
    pub fn start_of(&self, index: usize) -> u64 {
        self.sums.prefix_sum(index)
    }

    pub fn total(&self) -> u64 {
        self.sums.total()
    }

    /// Index of the item covering `offset` (clamped to the last item).
    pub fn index_at_offset(&self, offset: u64) -> usize {
        if self.sizes.is_empty() {
            return 0;
        }
        self.sums.lower_bound(offset).min(self.sizes.len() - 1)
    }

    pub fn excluded(&self) -> Option<usize> {
        self.excluded
    }

    /// Excludes `index` from cumulative queries (or restores the previous exclusion with `None`).
    pub fn set_excluded(&mut self, index: Option<usize>) {
        if self.excluded == index {
            return;
        }
        if let Some(prev) = self.excluded.take() {
            if let Some(&size) = self.sizes.get(prev) {
                self.sums.add(prev, size as i64);
            }
        }
        if let Some(next) = index.filter(|&i| i < self.sizes.len()) {
            self.sums.add(next, -(self.sizes[next] as i64));
            self.excluded = Some(next);
        }
    }

    /// Grows with unmeasured entries or purges entries past `count`.
    ///
    /// Shrinking resets the minimum observed height: a shorter collection may no longer
    /// contain the rows that set it.
    pub fn resize(&mut self, count: usize) {
        let cur = self.sizes.len();
        if count > cur {
            for _ in cur..count {
                self.sizes.push(self.default_height);
                self.measured.push(false);
                self.sums.push_value(self.default_height as u64);
            }
        } else if count < cur {
            if self.excluded.is_some_and(|i| i >= count) {
                self.excluded = None;
            }
            self.sizes.truncate(count);
            self.measured.truncate(count);
            self.sums.truncate(count);
            self.min_measured = None;
            vdebug!(count, "HeightCache: purged entries past count");
        }
    }

    /// Inserts `count` unmeasured entries before `index`; later entries shift up.
    pub fn insert(&mut self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        let index = index.min(self.sizes.len());
        if index == self.sizes.len() {
            self.resize(index + count);
            return;
        }
        let default_height = self.default_height;
        self.sizes
            .splice(index..index, core::iter::repeat_n(default_height, count));
        self.measured
            .splice(index..index, core::iter::repeat_n(false, count));
        if let Some(excluded) = self.excluded.as_mut() {
            if *excluded >= index {
                *excluded += count;
            }
        }
        self.rebuild_sums();
    }

    /// Removes the entries at `indices` (sorted ascending); later entries shift down.
    pub fn remove(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        let mut removed = indices.iter().copied().peekable();
        let mut kept = 0usize;
        let mut excluded = None;
        for i in 0..self.sizes.len() {
            if removed.peek() == Some(&i) {
                while removed.peek() == Some(&i) {
                    removed.next();
                }
                continue;
            }
            if self.excluded == Some(i) {
                excluded = Some(kept);
            }
            self.sizes[kept] = self.sizes[i];
            self.measured[kept] = self.measured[i];
            kept += 1;
        }
        self.sizes.truncate(kept);
        self.measured.truncate(kept);
        self.excluded = excluded;
        self.min_measured = None;
        self.rebuild_sums();
    }

    /// Moves the entry at `from` so that it ends up at `to`.
    pub fn move_entry(&mut self, from: usize, to: usize) {
        let len = self.sizes.len();
        if from >= len || to >= len || from == to {
            return;
        }
        let size = self.sizes.remove(from);
        let measured = self.measured.remove(from);
        self.sizes.insert(to, size);
        self.measured.insert(to, measured);
        if let Some(excluded) = self.excluded {
            self.excluded = Some(shift_for_move(excluded, from, to));
        }
        self.rebuild_sums();
    }

    /// Forgets every measurement.
    pub fn reset(&mut self) {
        let count = self.sizes.len();
        let excluded = self.excluded;
        *self = Self::new(count, self.default_height);
        self.set_excluded(excluded);
    }

    fn rebuild_sums(&mut self) {
        let excluded = self.excluded;
        self.sums = Fenwick::from_sizes(
            self.sizes
                .iter()
                .enumerate()
                .map(|(i, &s)| if Some(i) == excluded { 0 } else { s }),
        );
    }
}

/// Where an index lands after the entry at `from` moves to `to`.
pub(crate) fn shift_for_move(index: usize, from: usize, to: usize) -> usize {
    if index == from {
        to
    } else if from < index && index <= to {
        index - 1
    } else if to <= index && index < from {
        index + 1
    } else {
        index
    }
}
