use alloc::collections::BTreeSet;

use crate::controller::ScrollTracker;
use crate::height_cache::shift_for_move;
use crate::options::round_height;
use crate::pool::ReusableItem;
use crate::window::ItemWindow;
use crate::{
    DebouncedTask, HeightCache, ItemBinder, ItemElement, ResolvedRect, ScrollDirection,
    ScrollTarget, VirtualizationController, VirtualizationMethod, VirtualizationOptions,
    VirtualizationState, VisibleRange,
};

/// Scroll position expressed relative to an item, so it survives height corrections above it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Anchor {
    index: usize,
    offset: u64,
}

/// Virtualization for rows whose heights are only known after layout.
///
/// Rows are bound first and measured later: until the host reports a row's geometry through
/// [`on_geometry_changed`](VirtualizationController::on_geometry_changed), the row is
/// accounted for with the default expected height and sits in the waiting set.
///
/// Height corrections keep the view stable in one of two ways:
/// - when the offset was at its maximum, the view re-pins to the new maximum;
/// - otherwise, the offset is re-derived from the anchor item.
///
/// Re-pinning takes precedence when both apply.
#[derive(Debug)]
pub struct DynamicHeightController<E> {
    heights: HeightCache,
    extra_visible_items: usize,
    window: ItemWindow<E>,
    first_visible_index: usize,
    scroll: ScrollTracker,
    count: usize,
    anchor: Option<Anchor>,
    waiting: BTreeSet<usize>,
    dragged_index: Option<usize>,
    fill_task: DebouncedTask,
    scroll_task: DebouncedTask,
    pending_scroll: Option<ScrollTarget>,
}

impl<E: ItemElement> DynamicHeightController<E> {
    pub fn new(options: &VirtualizationOptions) -> Self {
        Self {
            heights: HeightCache::new(0, options.item_height.max(1)),
            extra_visible_items: options.extra_visible_items,
            window: ItemWindow::default(),
            first_visible_index: 0,
            scroll: ScrollTracker::new(options.scroll_direction_reset_delay_ms),
            count: 0,
            anchor: None,
            waiting: BTreeSet::new(),
            dragged_index: None,
            fill_task: DebouncedTask::new(0),
            scroll_task: DebouncedTask::new(0),
            pending_scroll: None,
        }
    }

    pub fn heights(&self) -> &HeightCache {
        &self.heights
    }

    /// Total height of the items `[0, index]`; a dragged item counts as zero.
    pub fn content_height_for_index(&self, index: usize) -> u64 {
        self.heights.content_height_for_index(index)
    }

    /// Records a measured height for `index`. Returns the change in content height.
    pub fn register_item_height(&mut self, index: usize, height: u32) -> i64 {
        self.waiting.remove(&index);
        self.heights.register(index, height)
    }

    /// Indices bound to a row but not measured yet.
    pub fn waiting_for_layout(&self) -> impl Iterator<Item = usize> + '_ {
        self.waiting.iter().copied()
    }

    pub fn is_fill_scheduled(&self) -> bool {
        self.fill_task.is_pending()
    }

    fn max_rows(&self) -> usize {
        let min = self.heights.min_item_height() as u64;
        let rows = (self.scroll.viewport as u64).div_ceil(min) as usize;
        let ghost = usize::from(self.dragged_index.is_some());
        rows.saturating_add(self.extra_visible_items).saturating_add(ghost)
    }

    fn sync_count(&mut self, binder: &dyn ItemBinder<E>) {
        let count = binder.item_count();
        self.count = count;
        if self.heights.len() != count {
            self.heights.resize(count);
        }
        self.waiting.retain(|&i| i < count);
        if self.dragged_index.is_some_and(|i| i >= count) {
            self.dragged_index = None;
            self.heights.set_excluded(None);
        }
    }

    fn offset_from_anchor(&self) -> Option<u64> {
        let anchor = self.anchor?;
        if anchor.index >= self.heights.len() {
            return None;
        }
        Some(self.heights.start_of(anchor.index) + anchor.offset)
    }

    /// Re-derives the first visible index from the offset, rotates rows and fills the viewport.
    fn layout(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.sync_count(binder);
        let offset = self.scroll.offset.min(self.max_scroll_offset());
        self.scroll.offset = offset;

        let first = if self.count == 0 {
            0
        } else {
            self.heights.index_at_offset(offset)
        };
        let prev = self.first_visible_index;
        if first != prev {
            self.window.cycle(prev, first);
            self.first_visible_index = first;
        }
        self.anchor = (self.count > 0).then(|| Anchor {
            index: first,
            offset: offset - self.heights.start_of(first),
        });
        self.fill(binder);
    }

    /// Binds rows from the first visible index until the viewport is covered.
    ///
    /// Rows past the covered range are hidden, not released; the window only grows up to the
    /// number of minimum-height rows the viewport can hold. The waiting set is rebuilt from the
    /// rows bound here, so it never outgrows the window.
    fn fill(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.waiting.clear();
        let first = self.first_visible_index;
        let bottom = self.scroll.offset + self.scroll.viewport as u64;
        let mut cursor = self.heights.start_of(first);

        for slot in 0..self.window.len() {
            let index = first + slot;
            let Some(item) = self.window.slot_mut(slot) else {
                break;
            };
            if index < self.count && cursor < bottom {
                item.setup(index, None, binder);
                cursor += self.heights.effective_height(index) as u64;
                if !self.heights.is_measured(index) && self.dragged_index != Some(index) {
                    self.waiting.insert(index);
                }
            } else {
                item.hide(binder);
            }
        }

        let max_rows = self.max_rows();
        while cursor < bottom
            && first + self.window.len() < self.count
            && self.window.len() < max_rows
        {
            let index = first + self.window.len();
            self.window.push(binder);
            if let Some(item) = self.window.slot_mut(index - first) {
                item.setup(index, None, binder);
            }
            cursor += self.heights.effective_height(index) as u64;
            if !self.heights.is_measured(index) && self.dragged_index != Some(index) {
                self.waiting.insert(index);
            }
        }

        self.window.mark_ghost(self.dragged_index);
        vtrace!(
            first,
            rows = self.window.len(),
            waiting = self.waiting.len(),
            "DynamicHeightController: fill"
        );
    }

    fn anchor_after_reindex(&mut self) {
        if let Some(offset) = self.offset_from_anchor() {
            self.scroll.offset = offset;
        }
        if let Some(anchor) = self.anchor {
            self.first_visible_index = anchor.index;
        }
    }
}

impl<E: ItemElement> VirtualizationController<E> for DynamicHeightController<E> {
    fn method(&self) -> VirtualizationMethod {
        VirtualizationMethod::DynamicHeight
    }

    fn index_from_position(&self, position: u64) -> usize {
        self.heights.index_at_offset(position)
    }

    fn expected_content_height(&self) -> u64 {
        self.heights.total()
    }

    fn content_padding(&self) -> u64 {
        self.heights.start_of(self.first_visible_index)
    }

    fn first_visible_index(&self) -> usize {
        self.first_visible_index
    }

    fn visible_range(&self) -> VisibleRange {
        let start = self.first_visible_index.min(self.count);
        if self.count == 0 || self.scroll.viewport == 0 {
            return VisibleRange {
                start_index: start,
                end_index: start,
            };
        }
        let last = self
            .heights
            .index_at_offset(self.scroll.offset + self.scroll.viewport as u64 - 1);
        VisibleRange {
            start_index: start,
            end_index: (last + 1).clamp(start, self.count),
        }
    }

    fn scroll_offset(&self) -> u64 {
        self.scroll.offset
    }

    fn viewport_height(&self) -> u32 {
        self.scroll.viewport
    }

    fn is_scrolling(&self) -> bool {
        self.scroll.is_scrolling()
    }

    fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll.direction()
    }

    fn active_items(&self) -> &[ReusableItem<E>] {
        self.window.items()
    }

    fn created_items(&self) -> usize {
        self.window.created()
    }

    fn item_height(&self) -> u32 {
        self.heights.default_height()
    }

    fn set_item_height(&mut self, height: u32, binder: &mut dyn ItemBinder<E>) {
        self.heights.set_default_height(height.max(1));
        self.anchor_after_reindex();
        self.layout(binder);
    }

    fn resize(&mut self, viewport_height: u32, binder: &mut dyn ItemBinder<E>) {
        self.sync_count(binder);
        self.scroll.viewport = viewport_height;
        let max_rows = self.max_rows();
        vdebug!(viewport_height, max_rows, count = self.count, "DynamicHeightController: resize");
        self.window.truncate(max_rows, binder);
        self.layout(binder);
    }

    fn on_scroll(&mut self, offset: u64, now_ms: u64, binder: &mut dyn ItemBinder<E>) {
        self.scroll.notify_scroll(offset, now_ms);
        self.scroll.offset = offset;
        self.pending_scroll = None;
        self.scroll_task.cancel();
        vtrace!(offset, "DynamicHeightController: scroll");
        self.layout(binder);
    }

    fn scroll_to_item(
        &mut self,
        target: ScrollTarget,
        _now_ms: u64,
        binder: &mut dyn ItemBinder<E>,
    ) {
        self.sync_count(binder);
        if self.count == 0 {
            return;
        }
        let view = self.scroll.viewport as u64;
        let offset = self.scroll.offset;
        let next = match target {
            ScrollTarget::End => self.max_scroll_offset(),
            ScrollTarget::Index(index) => {
                let index = index.min(self.count - 1);
                let start = self.heights.start_of(index);
                let end = start + self.heights.effective_height(index) as u64;
                if start <= offset || index <= self.first_visible_index {
                    start
                } else if end > offset + view {
                    end.saturating_sub(view)
                } else {
                    self.pending_scroll = None;
                    return;
                }
            }
        };
        self.scroll.offset = next;
        self.layout(binder);

        // Rows bound by this jump are measured later; retarget once they are.
        self.pending_scroll = if self.waiting.is_empty() {
            None
        } else {
            Some(target)
        };
    }

    fn refresh(&mut self, rebuild: bool, binder: &mut dyn ItemBinder<E>) {
        if rebuild {
            vdebug!("DynamicHeightController: rebuild");
            self.window.destroy(binder);
            self.waiting.clear();
        } else {
            self.window.unbind_all(binder);
        }
        self.layout(binder);
    }

    fn on_items_source_size_changed(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.sync_count(binder);
        self.layout(binder);
    }

    fn on_items_inserted(&mut self, index: usize, count: usize) {
        if count == 0 {
            return;
        }
        self.heights.insert(index, count);
        self.count = self.heights.len();
        self.waiting = self
            .waiting
            .iter()
            .map(|&i| if i >= index { i + count } else { i })
            .collect();
        if let Some(dragged) = self.dragged_index.as_mut() {
            if *dragged >= index {
                *dragged += count;
            }
        }
        if let Some(anchor) = self.anchor.as_mut() {
            if anchor.index >= index {
                anchor.index += count;
            }
        }
        self.anchor_after_reindex();
    }

    fn on_items_removed(&mut self, indices: &[usize]) {
        if indices.is_empty() {
            return;
        }
        self.heights.remove(indices);
        self.count = self.heights.len();
        self.waiting = self
            .waiting
            .iter()
            .filter_map(|&i| index_after_removal(i, indices))
            .collect();
        self.dragged_index = self
            .dragged_index
            .and_then(|i| index_after_removal(i, indices));
        if let Some(anchor) = self.anchor {
            self.anchor = match index_after_removal(anchor.index, indices) {
                Some(index) => Some(Anchor { index, ..anchor }),
                None => {
                    let below = indices.partition_point(|&i| i < anchor.index);
                    let index = (anchor.index - below).min(self.count.saturating_sub(1));
                    (self.count > 0).then_some(Anchor { index, offset: 0 })
                }
            };
        }
        self.anchor_after_reindex();
    }

    fn on_item_moved(&mut self, from: usize, to: usize) {
        self.heights.move_entry(from, to);
        self.waiting = self
            .waiting
            .iter()
            .map(|&i| shift_for_move(i, from, to))
            .collect();
        if let Some(anchor) = self.anchor.as_mut() {
            anchor.index = shift_for_move(anchor.index, from, to);
        }
        self.anchor_after_reindex();
    }

    fn on_items_reset(&mut self) {
        vdebug!("DynamicHeightController: items reset");
        self.heights.reset();
        self.waiting.clear();
    }

    fn on_geometry_changed(
        &mut self,
        index: usize,
        rect: ResolvedRect,
        now_ms: u64,
        _binder: &mut dyn ItemBinder<E>,
    ) {
        let height = rect.height;
        if !height.is_finite() || height <= 0.0 {
            vtrace!(index, height, "DynamicHeightController: ignoring unresolved height");
            return;
        }
        if self.dragged_index == Some(index) {
            return;
        }
        if self.window.find(index).is_none() {
            vwarn!(index, "DynamicHeightController: geometry for a row outside the window");
            return;
        }

        let max_before = self.max_scroll_offset();
        let pinned = max_before > 0 && self.scroll.offset >= max_before;
        let delta = self.register_item_height(index, round_height(height).max(1));
        if delta != 0 {
            if pinned {
                self.scroll.offset = self.max_scroll_offset();
            } else if self.anchor.is_some_and(|a| index < a.index) {
                if let Some(offset) = self.offset_from_anchor() {
                    self.scroll.offset = offset.min(self.max_scroll_offset());
                }
            }
            vtrace!(index, delta, offset = self.scroll.offset, "DynamicHeightController: height");
            self.fill_task.schedule(now_ms);
        }
        if self.waiting.is_empty() && self.pending_scroll.is_some() {
            self.scroll_task.schedule(now_ms);
        }
    }

    fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    fn start_drag(&mut self, index: usize, binder: &mut dyn ItemBinder<E>) {
        self.sync_count(binder);
        if index >= self.count {
            vwarn!(index, count = self.count, "DynamicHeightController: drag index out of range");
            return;
        }
        self.dragged_index = Some(index);
        self.heights.set_excluded(Some(index));
        self.waiting.remove(&index);
        self.layout(binder);
    }

    fn end_drag(&mut self, now_ms: u64, _binder: &mut dyn ItemBinder<E>) {
        if self.dragged_index.take().is_none() {
            vwarn!("DynamicHeightController: end_drag without an active drag");
            return;
        }
        self.heights.set_excluded(None);
        self.window.mark_ghost(None);
        self.fill_task.schedule(now_ms);
    }

    fn tick(&mut self, now_ms: u64, binder: &mut dyn ItemBinder<E>) {
        self.scroll.tick(now_ms);
        let fill = self.fill_task.poll(now_ms);
        if self.scroll_task.poll(now_ms) {
            if let Some(target) = self.pending_scroll.take() {
                self.scroll_to_item(target, now_ms, binder);
                return;
            }
        }
        if fill {
            self.layout(binder);
        }
    }

    fn state(&self) -> VirtualizationState {
        VirtualizationState {
            first_visible_index: self.first_visible_index,
            scroll_offset: self.scroll.offset,
            content_height: self.heights.total(),
            content_padding: self.content_padding(),
            anchored_item_index: self.anchor.map(|a| a.index),
            anchor_offset: self.anchor.map_or(0, |a| a.offset),
        }
    }

    fn restore_state(&mut self, state: VirtualizationState, binder: &mut dyn ItemBinder<E>) {
        self.sync_count(binder);
        self.scroll.offset = state.scroll_offset;
        self.anchor = state
            .anchored_item_index
            .filter(|&i| i < self.count)
            .map(|index| Anchor {
                index,
                offset: state.anchor_offset,
            });
        self.anchor_after_reindex();
        self.layout(binder);
    }

    fn destroy(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.window.destroy(binder);
        self.first_visible_index = 0;
        self.waiting.clear();
        self.fill_task.cancel();
        self.scroll_task.cancel();
    }
}

/// Where `index` lands after removing `removed` (sorted ascending); `None` if it was removed.
fn index_after_removal(index: usize, removed: &[usize]) -> Option<usize> {
    match removed.binary_search(&index) {
        Ok(_) => None,
        Err(below) => Some(index - below),
    }
}
