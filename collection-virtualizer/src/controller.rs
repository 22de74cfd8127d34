use alloc::boxed::Box;
use core::cmp;

use crate::pool::ReusableItem;
use crate::{
    DebouncedTask, DynamicHeightController, FixedHeightController, ItemBinder, ItemElement,
    ResolvedRect, ScrollDirection, ScrollTarget, VirtualizationMethod, VirtualizationOptions,
    VirtualizationState, VisibleRange,
};

/// A scrollable window of recycled rows over an indexed collection.
///
/// Implementations own the active rows and the scroll offset; the collection itself is only
/// reached through the [`ItemBinder`] passed into each operation. Every operation runs to
/// completion synchronously, except work explicitly deferred to [`tick`](Self::tick).
pub trait VirtualizationController<E: ItemElement> {
    fn method(&self) -> VirtualizationMethod;

    /// Item under content position `position` (not clamped to the item count).
    fn index_from_position(&self, position: u64) -> usize;

    /// Total content height, using estimates for anything not yet measured.
    fn expected_content_height(&self) -> u64;

    /// Space above the first active row (the content height of every index before it).
    fn content_padding(&self) -> u64;

    fn first_visible_index(&self) -> usize;

    /// Indices intersecting the viewport.
    fn visible_range(&self) -> VisibleRange;

    fn scroll_offset(&self) -> u64;

    fn viewport_height(&self) -> u32;

    fn max_scroll_offset(&self) -> u64 {
        self.expected_content_height()
            .saturating_sub(self.viewport_height() as u64)
    }

    fn is_scrolling(&self) -> bool;

    fn scroll_direction(&self) -> Option<ScrollDirection>;

    /// Active rows in display order.
    fn active_items(&self) -> &[ReusableItem<E>];

    fn item_for_index(&self, index: usize) -> Option<&ReusableItem<E>> {
        self.active_items()
            .iter()
            .find(|item| item.index() == Some(index))
    }

    /// Number of row elements currently instantiated, pooled ones included.
    fn created_items(&self) -> usize;

    fn item_height(&self) -> u32;

    fn set_item_height(&mut self, height: u32, binder: &mut dyn ItemBinder<E>);

    /// Viewport geometry changed.
    fn resize(&mut self, viewport_height: u32, binder: &mut dyn ItemBinder<E>);

    /// User scroll. `now_ms` drives `is_scrolling` debouncing.
    fn on_scroll(&mut self, offset: u64, now_ms: u64, binder: &mut dyn ItemBinder<E>);

    fn scroll_to_item(&mut self, target: ScrollTarget, now_ms: u64, binder: &mut dyn ItemBinder<E>);

    /// Rebinds every active row; `rebuild` also destroys and recreates the row pool.
    fn refresh(&mut self, rebuild: bool, binder: &mut dyn ItemBinder<E>);

    /// The item count reported by `binder` changed.
    fn on_items_source_size_changed(&mut self, binder: &mut dyn ItemBinder<E>);

    /// `count` items were inserted before `index`.
    fn on_items_inserted(&mut self, index: usize, count: usize) {
        let _ = (index, count);
    }

    /// The items at `indices` (sorted ascending) were removed.
    fn on_items_removed(&mut self, indices: &[usize]) {
        let _ = indices;
    }

    fn on_item_moved(&mut self, from: usize, to: usize) {
        let _ = (from, to);
    }

    /// Every index was reassigned; per-index caches no longer apply.
    fn on_items_reset(&mut self) {}

    /// Layout resolved the geometry of the row bound to `index`.
    fn on_geometry_changed(
        &mut self,
        index: usize,
        rect: ResolvedRect,
        now_ms: u64,
        binder: &mut dyn ItemBinder<E>,
    ) {
        let _ = (index, rect, now_ms, binder);
    }

    fn dragged_index(&self) -> Option<usize>;

    fn start_drag(&mut self, index: usize, binder: &mut dyn ItemBinder<E>);

    /// Ends a drag. The dragged row becomes a normal row again and one more layout pass runs.
    fn end_drag(&mut self, now_ms: u64, binder: &mut dyn ItemBinder<E>);

    /// Runs deferred work that is due.
    fn tick(&mut self, now_ms: u64, binder: &mut dyn ItemBinder<E>);

    fn state(&self) -> VirtualizationState;

    fn restore_state(&mut self, state: VirtualizationState, binder: &mut dyn ItemBinder<E>);

    /// Releases every row and destroys the pool.
    fn destroy(&mut self, binder: &mut dyn ItemBinder<E>);
}

/// Creates the controller matching `options.method`.
pub fn create_controller<E: ItemElement + 'static>(
    options: &VirtualizationOptions,
) -> Box<dyn VirtualizationController<E>> {
    match options.method {
        VirtualizationMethod::FixedHeight => Box::new(FixedHeightController::new(options)),
        VirtualizationMethod::DynamicHeight => Box::new(DynamicHeightController::new(options)),
    }
}

/// Scroll offset, viewport and user-scroll tracking shared by the controllers.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ScrollTracker {
    pub(crate) offset: u64,
    pub(crate) viewport: u32,
    direction: Option<ScrollDirection>,
    reset: DebouncedTask,
}

impl ScrollTracker {
    pub(crate) fn new(reset_delay_ms: u64) -> Self {
        Self {
            offset: 0,
            viewport: 0,
            direction: None,
            reset: DebouncedTask::new(reset_delay_ms),
        }
    }

    pub(crate) fn is_scrolling(&self) -> bool {
        self.reset.is_pending()
    }

    pub(crate) fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    /// Records a user scroll towards `offset`.
    pub(crate) fn notify_scroll(&mut self, offset: u64, now_ms: u64) {
        match offset.cmp(&self.offset) {
            cmp::Ordering::Greater => self.direction = Some(ScrollDirection::Forward),
            cmp::Ordering::Less => self.direction = Some(ScrollDirection::Backward),
            cmp::Ordering::Equal => {}
        }
        self.reset.schedule(now_ms);
    }

    pub(crate) fn tick(&mut self, now_ms: u64) {
        if self.reset.poll(now_ms) {
            self.direction = None;
        }
    }
}
