use alloc::vec::Vec;

use collection_virtualizer::{ItemId, Result, ScrollTarget, VisibleRange};

use crate::view::DragState;
use crate::{CollectionView, CollectionViewController, ItemFactory, SelectionType};

/// A scrollable, virtualized window of rows.
pub trait VirtualizedWindow {
    /// The viewport was resized to `viewport_height` pixels.
    fn resize(&mut self, viewport_height: u32);

    /// The host scrolled to `offset`.
    fn on_scroll(&mut self, offset: u64, now_ms: u64);

    /// Scrolls the minimum amount that makes `index` fully visible.
    fn scroll_to_item(&mut self, index: usize);

    fn scroll_to_end(&mut self);

    fn scroll_offset(&self) -> u64;

    fn first_visible_index(&self) -> usize;

    fn visible_range(&self) -> VisibleRange;

    /// Rebinds the active rows to their current items.
    fn refresh_items(&mut self);

    /// Returns every row to the pool and binds the window from scratch.
    fn rebuild(&mut self);
}

/// Item selection, keyed by id so that it survives index shifts.
pub trait Selectable {
    fn selection_type(&self) -> SelectionType;

    /// Changing the type trims the selection to what the new type allows.
    fn set_selection_type(&mut self, selection_type: SelectionType);

    /// The first selected index.
    fn selected_index(&self) -> Option<usize>;

    fn selected_indices(&self) -> &[usize];

    fn selected_ids(&self) -> &[ItemId];

    /// Replaces the selection. Out-of-range indices are ignored; a single-selection view keeps
    /// the last valid one.
    fn set_selection(&mut self, indices: &[usize]);

    fn set_selection_by_id(&mut self, ids: &[ItemId]);

    fn add_to_selection(&mut self, index: usize);

    fn remove_from_selection(&mut self, index: usize);

    fn clear_selection(&mut self);

    /// Selects every item. Only multiple-selection views do anything.
    fn select_all(&mut self);
}

/// Drag-and-drop reordering of rows.
pub trait Reorderable {
    fn is_reorderable(&self) -> bool;

    fn set_reorderable(&mut self, reorderable: bool);

    fn dragged_index(&self) -> Option<usize>;

    /// Starts dragging the row at `index`. Returns `false` if the view is not reorderable, a
    /// drag is already running or `index` is out of range.
    fn start_drag(&mut self, index: usize) -> bool;

    /// The dragged row hovers over `index`.
    fn drag_over(&mut self, index: usize);

    /// Drops the dragged row at the last hovered index. Returns `true` if an item moved.
    fn complete_drag(&mut self) -> Result<bool>;

    fn cancel_drag(&mut self);
}

impl<C, F> VirtualizedWindow for CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
    F::Element: 'static,
{
    fn resize(&mut self, viewport_height: u32) {
        let (v, mut b) = self.parts();
        v.resize(viewport_height, &mut b);
    }

    fn on_scroll(&mut self, offset: u64, now_ms: u64) {
        self.state.now_ms = now_ms;
        let (v, mut b) = self.parts();
        v.on_scroll(offset, now_ms, &mut b);
    }

    fn scroll_to_item(&mut self, index: usize) {
        if !self.controller.has_valid_data() || index >= self.controller.item_count() {
            return;
        }
        let now_ms = self.state.now_ms;
        let (v, mut b) = self.parts();
        v.scroll_to_item(ScrollTarget::Index(index), now_ms, &mut b);
    }

    fn scroll_to_end(&mut self) {
        if !self.controller.has_valid_data() {
            return;
        }
        let now_ms = self.state.now_ms;
        let (v, mut b) = self.parts();
        v.scroll_to_item(ScrollTarget::End, now_ms, &mut b);
    }

    fn scroll_offset(&self) -> u64 {
        self.state.virtualizer.scroll_offset()
    }

    fn first_visible_index(&self) -> usize {
        self.state.virtualizer.first_visible_index()
    }

    fn visible_range(&self) -> VisibleRange {
        self.state.virtualizer.visible_range()
    }

    fn refresh_items(&mut self) {
        self.state.refresh_pending = false;
        if !self.controller.has_valid_data() {
            return;
        }
        let selection_changed = self.refresh_selection();
        let (v, mut b) = self.parts();
        v.on_items_source_size_changed(&mut b);
        v.refresh(false, &mut b);
        if selection_changed {
            self.push_selection_event();
        }
    }

    fn rebuild(&mut self) {
        self.state.rebuild_task.cancel();
        self.state.refresh_pending = false;
        vdebug!(items = self.controller.item_count(), "CollectionView: rebuild");
        let selection_changed = self.refresh_selection();
        let (v, mut b) = self.parts();
        v.refresh(true, &mut b);
        if selection_changed {
            self.push_selection_event();
        }
    }
}

impl<C, F> CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
    F::Element: 'static,
{
    /// Replaces the selection with `entries`, emitting an event if anything changed.
    pub(crate) fn apply_selection(&mut self, entries: Vec<(usize, ItemId)>) {
        if self.state.selection.set(entries) {
            self.selection_changed();
        }
    }

    /// Selects the range between `origin` and `index`, in that order, keeping the range origin.
    pub(crate) fn select_range(&mut self, origin: usize, index: usize) {
        let entries: Vec<usize> = if origin <= index {
            (origin..=index).collect()
        } else {
            (index..=origin).rev().collect()
        };
        let entries = self.resolve(&entries);
        self.apply_selection(entries);
    }

    pub(crate) fn range_origin_index(&self) -> Option<usize> {
        self.state
            .range_origin
            .and_then(|id| self.controller.index_for_id(id))
    }

    fn resolve(&self, indices: &[usize]) -> Vec<(usize, ItemId)> {
        indices
            .iter()
            .filter_map(|&i| self.controller.id_for_index(i).map(|id| (i, id)))
            .collect()
    }

    fn can_select(&self) -> bool {
        self.options.selection_type != SelectionType::None && self.controller.has_valid_data()
    }
}

impl<C, F> Selectable for CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
    F::Element: 'static,
{
    fn selection_type(&self) -> SelectionType {
        self.options.selection_type
    }

    fn set_selection_type(&mut self, selection_type: SelectionType) {
        self.options.selection_type = selection_type;
        match selection_type {
            SelectionType::None => self.clear_selection(),
            SelectionType::Single => {
                let last = self.state.selection.last_index();
                let entries = last.map_or_else(Vec::new, |i| self.resolve(&[i]));
                self.apply_selection(entries);
            }
            SelectionType::Multiple => {}
        }
    }

    fn selected_index(&self) -> Option<usize> {
        self.state.selection.first_index()
    }

    fn selected_indices(&self) -> &[usize] {
        self.state.selection.indices()
    }

    fn selected_ids(&self) -> &[ItemId] {
        self.state.selection.ids()
    }

    fn set_selection(&mut self, indices: &[usize]) {
        if !self.can_select() {
            return;
        }
        let mut entries = self.resolve(indices);
        if self.options.selection_type == SelectionType::Single {
            entries = entries.pop().into_iter().collect();
        }
        self.state.range_origin = entries.last().map(|&(_, id)| id);
        self.apply_selection(entries);
    }

    fn set_selection_by_id(&mut self, ids: &[ItemId]) {
        if !self.can_select() {
            return;
        }
        let indices: Vec<usize> = ids
            .iter()
            .filter_map(|&id| self.controller.index_for_id(id))
            .collect();
        self.set_selection(&indices);
    }

    fn add_to_selection(&mut self, index: usize) {
        if !self.can_select() {
            return;
        }
        let Some(id) = self.controller.id_for_index(index) else {
            return;
        };
        self.state.range_origin = Some(id);
        if self.options.selection_type == SelectionType::Single {
            self.apply_selection(alloc::vec![(index, id)]);
        } else if self.state.selection.add(index, id) {
            self.selection_changed();
        }
    }

    fn remove_from_selection(&mut self, index: usize) {
        if !self.controller.has_valid_data() {
            return;
        }
        if self.state.selection.remove_index(index) {
            self.selection_changed();
        }
    }

    fn clear_selection(&mut self) {
        self.state.range_origin = None;
        if self.state.selection.clear() {
            self.selection_changed();
        }
    }

    fn select_all(&mut self) {
        if self.options.selection_type != SelectionType::Multiple
            || !self.controller.has_valid_data()
        {
            return;
        }
        let entries: Vec<(usize, ItemId)> = (0..self.controller.item_count())
            .filter_map(|i| self.controller.id_for_index(i).map(|id| (i, id)))
            .collect();
        self.apply_selection(entries);
    }
}

impl<C, F> Reorderable for CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
    F::Element: 'static,
{
    fn is_reorderable(&self) -> bool {
        self.options.reorderable
    }

    fn set_reorderable(&mut self, reorderable: bool) {
        self.options.reorderable = reorderable;
        if !reorderable {
            self.cancel_drag();
        }
    }

    fn dragged_index(&self) -> Option<usize> {
        self.state.drag.map(|drag| drag.from)
    }

    fn start_drag(&mut self, index: usize) -> bool {
        if !self.options.reorderable
            || self.state.drag.is_some()
            || !self.controller.has_valid_data()
        {
            return false;
        }
        let Some(id) = self.controller.id_for_index(index) else {
            return false;
        };
        vdebug!(index, id, "CollectionView: drag started");
        self.state.drag = Some(DragState {
            from: index,
            id,
            target: index,
        });
        let (v, mut b) = self.parts();
        v.start_drag(index, &mut b);
        true
    }

    fn drag_over(&mut self, index: usize) {
        let last = self.controller.item_count().saturating_sub(1);
        if let Some(drag) = self.state.drag.as_mut() {
            drag.target = index.min(last);
        }
    }

    fn complete_drag(&mut self) -> Result<bool> {
        let Some(drag) = self.state.drag.take() else {
            return Ok(false);
        };
        let now_ms = self.state.now_ms;
        {
            let (v, mut b) = self.parts();
            v.end_drag(now_ms, &mut b);
        }
        if drag.from == drag.target {
            return Ok(false);
        }
        vdebug!(
            from = drag.from,
            to = drag.target,
            "CollectionView: drag completed"
        );
        let res = self
            .controller
            .reorder_item(drag.from, drag.target, &mut self.state);
        self.sync(true);
        res.map(|()| true)
    }

    fn cancel_drag(&mut self) {
        if self.state.drag.take().is_none() {
            return;
        }
        let now_ms = self.state.now_ms;
        let (v, mut b) = self.parts();
        v.end_drag(now_ms, &mut b);
    }
}
