use crate::controller::ScrollTracker;
use crate::pool::ReusableItem;
use crate::window::ItemWindow;
use crate::{
    ItemBinder, ItemElement, ScrollDirection, ScrollTarget, VirtualizationController,
    VirtualizationMethod, VirtualizationOptions, VirtualizationState, VisibleRange,
};

/// Virtualization for rows that all share one height.
///
/// Index/offset conversions are O(1); scrolling rotates the active rows so an ordinary
/// scroll step never constructs or releases an element.
#[derive(Debug)]
pub struct FixedHeightController<E> {
    item_height: u32,
    extra_visible_items: usize,
    window: ItemWindow<E>,
    first_visible_index: usize,
    scroll: ScrollTracker,
    count: usize,
    dragged_index: Option<usize>,
}

impl<E: ItemElement> FixedHeightController<E> {
    pub fn new(options: &VirtualizationOptions) -> Self {
        Self {
            item_height: options.item_height.max(1),
            extra_visible_items: options.extra_visible_items,
            window: ItemWindow::default(),
            first_visible_index: 0,
            scroll: ScrollTracker::new(options.scroll_direction_reset_delay_ms),
            count: 0,
            dragged_index: None,
        }
    }

    fn needed_rows(&self) -> usize {
        let h = self.item_height as u64;
        let rows = (self.scroll.viewport as u64).div_ceil(h) as usize;
        rows.saturating_add(self.extra_visible_items).min(self.count)
    }

    /// Clamps `offset`, updates the first visible index and rebinds the rows that changed.
    fn apply_scroll(&mut self, offset: u64, force: bool, binder: &mut dyn ItemBinder<E>) {
        self.count = binder.item_count();
        let offset = offset.min(self.max_scroll_offset());
        self.scroll.offset = offset;

        let first = (offset / self.item_height as u64) as usize;
        let prev = self.first_visible_index;
        if first == prev && !force {
            return;
        }
        vtrace!(offset, first, prev, "FixedHeightController: scroll");
        self.window.cycle(prev, first);
        self.first_visible_index = first;
        self.window.setup_all(first, Some(self.item_height), binder);
        self.window.mark_ghost(self.dragged_index);
    }
}

impl<E: ItemElement> VirtualizationController<E> for FixedHeightController<E> {
    fn method(&self) -> VirtualizationMethod {
        VirtualizationMethod::FixedHeight
    }

    fn index_from_position(&self, position: u64) -> usize {
        (position / self.item_height as u64) as usize
    }

    fn expected_content_height(&self) -> u64 {
        self.count as u64 * self.item_height as u64
    }

    fn content_padding(&self) -> u64 {
        self.first_visible_index as u64 * self.item_height as u64
    }

    fn first_visible_index(&self) -> usize {
        self.first_visible_index
    }

    fn visible_range(&self) -> VisibleRange {
        let h = self.item_height as u64;
        let start = self.first_visible_index.min(self.count);
        let bottom = self.scroll.offset + self.scroll.viewport as u64;
        let end = (bottom.div_ceil(h) as usize).clamp(start, self.count);
        VisibleRange {
            start_index: start,
            end_index: end,
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
        self.item_height
    }

    fn set_item_height(&mut self, height: u32, binder: &mut dyn ItemBinder<E>) {
        let height = height.max(1);
        if self.item_height == height {
            return;
        }
        // Keep the first visible row at the top across the change.
        let first = self.first_visible_index;
        self.item_height = height;
        self.scroll.offset = first as u64 * height as u64;
        self.window.unbind_all(binder);
        let viewport = self.scroll.viewport;
        self.resize(viewport, binder);
    }

    fn resize(&mut self, viewport_height: u32, binder: &mut dyn ItemBinder<E>) {
        self.count = binder.item_count();
        self.scroll.viewport = viewport_height;
        let rows = self.needed_rows();
        vdebug!(viewport_height, rows, count = self.count, "FixedHeightController: resize");
        self.window.resize(rows, binder);
        let offset = self.scroll.offset;
        self.apply_scroll(offset, true, binder);
    }

    fn on_scroll(&mut self, offset: u64, now_ms: u64, binder: &mut dyn ItemBinder<E>) {
        self.scroll.notify_scroll(offset, now_ms);
        self.apply_scroll(offset, false, binder);
    }

    fn scroll_to_item(
        &mut self,
        target: ScrollTarget,
        _now_ms: u64,
        binder: &mut dyn ItemBinder<E>,
    ) {
        self.count = binder.item_count();
        if self.window.len() == 0 || self.count == 0 {
            return;
        }
        let h = self.item_height as u64;
        let view = self.scroll.viewport as u64;
        let offset = match target {
            ScrollTarget::End => self.max_scroll_offset(),
            ScrollTarget::Index(index) => {
                let index = index.min(self.count - 1);
                let start = index as u64 * h;
                let end = start + h;
                let current = self.scroll.offset;
                if start <= current {
                    start
                } else if end > current + view {
                    end - view
                } else {
                    return;
                }
            }
        };
        self.apply_scroll(offset, false, binder);
    }

    fn refresh(&mut self, rebuild: bool, binder: &mut dyn ItemBinder<E>) {
        if rebuild {
            vdebug!("FixedHeightController: rebuild");
            self.window.destroy(binder);
        } else {
            self.window.unbind_all(binder);
        }
        let viewport = self.scroll.viewport;
        self.resize(viewport, binder);
    }

    fn on_items_source_size_changed(&mut self, binder: &mut dyn ItemBinder<E>) {
        if self.dragged_index.is_some_and(|i| i >= binder.item_count()) {
            self.dragged_index = None;
        }
        let viewport = self.scroll.viewport;
        self.resize(viewport, binder);
    }

    fn dragged_index(&self) -> Option<usize> {
        self.dragged_index
    }

    fn start_drag(&mut self, index: usize, binder: &mut dyn ItemBinder<E>) {
        self.count = binder.item_count();
        if index >= self.count {
            vwarn!(index, count = self.count, "FixedHeightController: drag index out of range");
            return;
        }
        self.dragged_index = Some(index);
        self.window.mark_ghost(self.dragged_index);
    }

    fn end_drag(&mut self, _now_ms: u64, binder: &mut dyn ItemBinder<E>) {
        if self.dragged_index.take().is_none() {
            vwarn!("FixedHeightController: end_drag without an active drag");
            return;
        }
        self.window.mark_ghost(None);
        let offset = self.scroll.offset;
        self.apply_scroll(offset, true, binder);
    }

    fn tick(&mut self, now_ms: u64, _binder: &mut dyn ItemBinder<E>) {
        self.scroll.tick(now_ms);
    }

    fn state(&self) -> VirtualizationState {
        VirtualizationState {
            first_visible_index: self.first_visible_index,
            scroll_offset: self.scroll.offset,
            content_height: self.expected_content_height(),
            content_padding: self.content_padding(),
            anchored_item_index: None,
            anchor_offset: 0,
        }
    }

    fn restore_state(&mut self, state: VirtualizationState, binder: &mut dyn ItemBinder<E>) {
        self.scroll.offset = state.scroll_offset;
        let viewport = self.scroll.viewport;
        self.resize(viewport, binder);
    }

    fn destroy(&mut self, binder: &mut dyn ItemBinder<E>) {
        self.window.destroy(binder);
        self.first_visible_index = 0;
    }
}
