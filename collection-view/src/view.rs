use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use collection_virtualizer::{
    DebouncedTask, ItemElement, ItemId, ReusableItem, ResolvedRect, Result, ScrollDirection,
    Selection, VirtualizationController, VirtualizationMethod, VirtualizationState,
    create_controller, item_height_from_style,
};

use crate::binding::Binding;
use crate::{
    CollectionListener, CollectionViewController, CollectionViewEvent, CollectionViewOptions,
    ItemFactory, ItemsSource, ListViewController, PersistedViewState, Selectable,
    TreeViewController, TreeViewItemData, ViewDataStore, VirtualizedWindow,
};

pub type ListView<S, F> = CollectionView<ListViewController<S>, F>;
pub type TreeView<T, F> = CollectionView<TreeViewController<T>, F>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DragState {
    pub(crate) from: usize,
    pub(crate) id: ItemId,
    pub(crate) target: usize,
}

/// Everything the view owns besides its controller and factory.
///
/// It is also the listener the controller reports structural changes to, so the virtualizer
/// can re-key its per-index state before the next layout.
pub(crate) struct ViewState<E: ItemElement> {
    pub(crate) virtualizer: Box<dyn VirtualizationController<E>>,
    pub(crate) selection: Selection,
    pub(crate) range_origin: Option<ItemId>,
    pub(crate) drag: Option<DragState>,
    pub(crate) events: Vec<CollectionViewEvent>,
    pub(crate) rebuild_task: DebouncedTask,
    pub(crate) refresh_pending: bool,
    pub(crate) structure_changed: bool,
    pub(crate) now_ms: u64,
}

/// Calls `f(start, len)` for every run of consecutive values in `indices` (ascending).
fn for_each_run(indices: &[usize], mut f: impl FnMut(usize, usize)) {
    let mut iter = indices.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut len = 1;
        while iter.peek() == Some(&(start + len)) {
            iter.next();
            len += 1;
        }
        f(start, len);
    }
}

impl<E: ItemElement> CollectionListener for ViewState<E> {
    fn items_added(&mut self, indices: &[usize]) {
        let virtualizer = &mut self.virtualizer;
        for_each_run(indices, |start, len| virtualizer.on_items_inserted(start, len));
        self.events.push(CollectionViewEvent::ItemsAdded(indices.to_vec()));
        self.structure_changed = true;
    }

    fn items_removed(&mut self, indices: &[usize]) {
        self.virtualizer.on_items_removed(indices);
        self.events
            .push(CollectionViewEvent::ItemsRemoved(indices.to_vec()));
        self.structure_changed = true;
    }

    fn item_index_changed(&mut self, from: usize, to: usize) {
        self.virtualizer.on_item_moved(from, to);
        self.events
            .push(CollectionViewEvent::ItemIndexChanged { from, to });
        self.structure_changed = true;
    }

    fn items_reset(&mut self) {
        self.virtualizer.on_items_reset();
        self.events.push(CollectionViewEvent::ItemsSourceChanged);
        self.structure_changed = true;
    }

    fn item_expanded_changed(&mut self, id: ItemId, expanded: bool) {
        self.events
            .push(CollectionViewEvent::ItemExpandedChanged { id, expanded });
    }

    fn items_source_size_changed(&mut self) {
        self.structure_changed = true;
    }
}

/// A vertical, virtualized view over a [`CollectionViewController`].
///
/// The view owns:
/// - the data controller (list or tree) and the item factory that builds its rows;
/// - a virtualization controller (fixed or dynamic height) holding the recycled rows;
/// - selection, drag-reorder state and an event queue.
///
/// The host drives it with viewport sizes, scroll offsets, resolved row geometry, input and a
/// millisecond clock through [`tick`](Self::tick). The window, selection and reorder
/// capabilities live in the [`VirtualizedWindow`], [`Selectable`] and
/// [`Reorderable`](crate::Reorderable) traits.
pub struct CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
{
    pub(crate) controller: C,
    pub(crate) factory: F,
    pub(crate) options: CollectionViewOptions,
    pub(crate) state: ViewState<F::Element>,
}

impl<C, F> fmt::Debug for CollectionView<C, F>
where
    C: CollectionViewController + fmt::Debug,
    F: ItemFactory<C::Item>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionView")
            .field("controller", &self.controller)
            .field("options", &self.options)
            .field("selection", &self.state.selection)
            .field("state", &self.state.virtualizer.state())
            .finish_non_exhaustive()
    }
}

impl<C, F> CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
    F::Element: 'static,
{
    pub fn new(controller: C, factory: F, options: CollectionViewOptions) -> Result<Self> {
        options.validate()?;
        let virtualizer = create_controller(&options.virtualization);
        let rebuild_task = DebouncedTask::new(options.rebuild_delay_ms);
        Ok(Self {
            controller,
            factory,
            options,
            state: ViewState {
                virtualizer,
                selection: Selection::new(),
                range_origin: None,
                drag: None,
                events: Vec::new(),
                rebuild_task,
                refresh_pending: false,
                structure_changed: false,
                now_ms: 0,
            },
        })
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Direct access to the controller. Mutations made through it are not announced; follow
    /// up with [`refresh_items`](VirtualizedWindow::refresh_items) or
    /// [`rebuild`](VirtualizedWindow::rebuild).
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn options(&self) -> &CollectionViewOptions {
        &self.options
    }

    pub fn virtualizer(&self) -> &dyn VirtualizationController<F::Element> {
        self.state.virtualizer.as_ref()
    }

    /// Active rows in display order.
    pub fn active_items(&self) -> &[ReusableItem<F::Element>] {
        self.state.virtualizer.active_items()
    }

    pub fn item_count(&self) -> usize {
        self.controller.item_count()
    }

    pub fn is_scrolling(&self) -> bool {
        self.state.virtualizer.is_scrolling()
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.state.virtualizer.scroll_direction()
    }

    /// Drains the queued notifications.
    pub fn take_events(&mut self) -> Vec<CollectionViewEvent> {
        core::mem::take(&mut self.state.events)
    }

    /// Sets the row height (fixed mode) or the estimate for unmeasured rows (dynamic mode).
    pub fn set_item_height(&mut self, height: f32) -> Result<()> {
        let height = item_height_from_style(height)?;
        self.options.virtualization.item_height = height;
        let (v, mut b) = self.parts();
        v.set_item_height(height, &mut b);
        Ok(())
    }

    /// Switches between fixed and dynamic heights. The row pool is destroyed and rebuilt.
    pub fn set_virtualization_method(&mut self, method: VirtualizationMethod) {
        if self.options.virtualization.method == method {
            return;
        }
        vdebug!(?method, "CollectionView: switching virtualization method");
        let viewport = self.state.virtualizer.viewport_height();
        let offset = self.state.virtualizer.scroll_offset();
        {
            let (v, mut b) = self.parts();
            v.destroy(&mut b);
        }
        self.options.virtualization.method = method;
        self.state.virtualizer = create_controller(&self.options.virtualization);
        let (v, mut b) = self.parts();
        v.resize(viewport, &mut b);
        v.restore_state(
            VirtualizationState {
                scroll_offset: offset,
                ..VirtualizationState::default()
            },
            &mut b,
        );
    }

    /// The layout engine resolved the geometry of the row bound to `index`.
    pub fn on_geometry_changed(&mut self, index: usize, rect: ResolvedRect, now_ms: u64) {
        self.state.now_ms = now_ms;
        let (v, mut b) = self.parts();
        v.on_geometry_changed(index, rect, now_ms, &mut b);
    }

    pub fn scroll_to_item_by_id(&mut self, id: ItemId) -> bool {
        let Some(index) = self.controller.index_for_id(id) else {
            return false;
        };
        self.scroll_to_item(index);
        true
    }

    /// Rebinds the active rows on the next `tick`, unless a rebuild is already scheduled.
    pub fn schedule_refresh(&mut self) {
        if !self.state.rebuild_task.is_pending() {
            self.state.refresh_pending = true;
        }
    }

    /// Rebuilds the row pool once the rebuild delay has passed. Supersedes a pending refresh;
    /// scheduling again pushes the rebuild back.
    pub fn schedule_rebuild(&mut self, now_ms: u64) {
        self.state.now_ms = now_ms;
        self.state.refresh_pending = false;
        self.state.rebuild_task.schedule(now_ms);
    }

    pub fn is_rebuild_scheduled(&self) -> bool {
        self.state.rebuild_task.is_pending()
    }

    /// Runs deferred work that is due: a scheduled rebuild or refresh, then the
    /// virtualizer's own fills and scroll retargets.
    pub fn tick(&mut self, now_ms: u64) {
        self.state.now_ms = now_ms;
        if self.state.rebuild_task.poll(now_ms) {
            self.rebuild();
        } else if core::mem::take(&mut self.state.refresh_pending) {
            self.refresh_items();
        }
        let (v, mut b) = self.parts();
        v.tick(now_ms, &mut b);
    }

    /// Writes scroll position, selection and expanded state under the view-data key.
    ///
    /// Returns `false` when the view has no key.
    pub fn save_view_data(&self, store: &mut dyn ViewDataStore) -> bool {
        let Some(key) = self.options.view_data_key.as_deref() else {
            return false;
        };
        store.store(
            key,
            PersistedViewState {
                virtualization: self.state.virtualizer.state(),
                selected_ids: self.state.selection.ids().to_vec(),
                expanded_ids: self.controller.expanded_ids(),
            },
        );
        true
    }

    /// Restores what [`save_view_data`](Self::save_view_data) wrote. Ids that no longer
    /// exist are dropped.
    pub fn restore_view_data(&mut self, store: &dyn ViewDataStore) -> bool {
        let Some(saved) = self
            .options
            .view_data_key
            .as_deref()
            .and_then(|key| store.load(key))
        else {
            return false;
        };
        vdebug!(
            selected = saved.selected_ids.len(),
            expanded = saved.expanded_ids.len(),
            "CollectionView: restoring view data"
        );
        self.controller
            .restore_expanded_ids(&saved.expanded_ids, &mut self.state);
        self.sync(true);
        self.set_selection_by_id(&saved.selected_ids);
        let (v, mut b) = self.parts();
        v.restore_state(saved.virtualization, &mut b);
        true
    }

    /// Splits the view into the virtualizer and a binder over the remaining fields.
    pub(crate) fn parts(
        &mut self,
    ) -> (
        &mut (dyn VirtualizationController<F::Element> + 'static),
        Binding<'_, C, F>,
    ) {
        (
            self.state.virtualizer.as_mut(),
            Binding::new(&self.controller, &mut self.factory, &self.state.selection),
        )
    }

    /// Re-resolves selected ids to indices. Returns `true` if the selection changed.
    pub(crate) fn refresh_selection(&mut self) -> bool {
        let controller = &self.controller;
        let changed = self
            .state
            .selection
            .refresh(|id| controller.index_for_id(id));
        if self
            .state
            .range_origin
            .is_some_and(|id| controller.index_for_id(id).is_none())
        {
            self.state.range_origin = None;
        }
        changed
    }

    /// Queues a selection event and rebinds the active rows so they show it.
    pub(crate) fn selection_changed(&mut self) {
        let (v, mut b) = self.parts();
        v.refresh(false, &mut b);
        self.push_selection_event();
    }

    pub(crate) fn push_selection_event(&mut self) {
        let selection = &self.state.selection;
        self.state.events.push(CollectionViewEvent::SelectionChanged {
            indices: selection.indices().to_vec(),
            ids: selection.ids().to_vec(),
        });
    }

    /// Brings selection, drag state and rows up to date after the controller announced
    /// structural changes, then rebinds the active rows. Without structural changes, rows are
    /// only rebound when `rebind` is set.
    pub(crate) fn sync(&mut self, rebind: bool) {
        if !core::mem::take(&mut self.state.structure_changed) {
            if rebind {
                let (v, mut b) = self.parts();
                v.refresh(false, &mut b);
            }
            return;
        }

        let selection_changed = self.refresh_selection();
        if let Some(drag) = self.state.drag {
            match self.controller.index_for_id(drag.id) {
                Some(from) => {
                    self.state.drag = Some(DragState { from, ..drag });
                }
                None => {
                    vwarn!(id = drag.id, "CollectionView: dragged item disappeared");
                    self.state.drag = None;
                    let now_ms = self.state.now_ms;
                    let (v, mut b) = self.parts();
                    v.end_drag(now_ms, &mut b);
                }
            }
        }

        // Index-keyed sources keep (index, id) pairs across edits, so rows rebind in full.
        let (v, mut b) = self.parts();
        v.on_items_source_size_changed(&mut b);
        v.refresh(false, &mut b);
        if selection_changed {
            self.push_selection_event();
        }
    }
}

impl<S, F> CollectionView<ListViewController<S>, F>
where
    S: ItemsSource,
    F: ItemFactory<S::Item>,
    F::Element: 'static,
{
    pub fn items_source(&self) -> Option<&S> {
        self.controller.source()
    }

    /// Replaces the items source; selection is kept for ids the new source still has.
    pub fn set_items_source(&mut self, source: Option<S>) -> Option<S> {
        let prev = self.controller.set_source(source, &mut self.state);
        self.sync(true);
        prev
    }

    pub fn add_items(&mut self, count: usize) -> Result<()> {
        let res = self.controller.add_items(count, &mut self.state);
        self.sync(false);
        res
    }

    pub fn insert_items(&mut self, index: usize, count: usize) -> Result<()> {
        let res = self.controller.insert_items(index, count, &mut self.state);
        self.sync(false);
        res
    }

    pub fn remove_items(&mut self, indices: &[usize]) -> Result<()> {
        let res = self.controller.remove_items(indices, &mut self.state);
        self.sync(false);
        res
    }

    pub fn remove_item(&mut self, index: usize) -> Result<()> {
        self.remove_items(&[index])
    }

    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let res = self.controller.move_item(from, to, &mut self.state);
        self.sync(false);
        res
    }

    pub fn clear_items(&mut self) -> Result<()> {
        let res = self.controller.clear_items(&mut self.state);
        self.sync(false);
        res
    }
}

impl<T, F> CollectionView<TreeViewController<T>, F>
where
    F: ItemFactory<T>,
    F::Element: 'static,
{
    pub fn set_root_items(&mut self, roots: Vec<TreeViewItemData<T>>) -> Result<()> {
        let res = self.controller.set_root_items(roots, &mut self.state);
        self.sync(true);
        res
    }

    pub fn add_item(
        &mut self,
        item: TreeViewItemData<T>,
        parent: Option<ItemId>,
        child_index: Option<usize>,
    ) -> Result<()> {
        let res = self
            .controller
            .add_item(item, parent, child_index, &mut self.state);
        self.sync(true);
        res
    }

    pub fn try_remove_item(&mut self, id: ItemId) -> bool {
        let removed = self.controller.try_remove_item(id, &mut self.state);
        self.sync(true);
        removed
    }

    pub fn move_item(
        &mut self,
        id: ItemId,
        new_parent: Option<ItemId>,
        child_index: usize,
    ) -> Result<()> {
        let res = self
            .controller
            .move_item(id, new_parent, child_index, &mut self.state);
        self.sync(true);
        res
    }

    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.controller.is_expanded(id)
    }

    pub fn expand_item(&mut self, id: ItemId, all: bool) -> Result<()> {
        let res = self.controller.expand_item(id, all, &mut self.state);
        self.sync(true);
        res
    }

    pub fn collapse_item(&mut self, id: ItemId, all: bool) -> Result<()> {
        let res = self.controller.collapse_item(id, all, &mut self.state);
        self.sync(true);
        res
    }

    pub fn expand_item_by_index(&mut self, index: usize, all: bool) -> bool {
        let changed = self
            .controller
            .expand_item_by_index(index, all, &mut self.state);
        self.sync(changed);
        changed
    }

    pub fn collapse_item_by_index(&mut self, index: usize, all: bool) -> bool {
        let changed = self
            .controller
            .collapse_item_by_index(index, all, &mut self.state);
        self.sync(changed);
        changed
    }

    /// Expands or collapses the node at `index`; `alt` applies it to the whole subtree.
    pub fn toggle_item_by_index(&mut self, index: usize, alt: bool) -> bool {
        let changed = self
            .controller
            .toggle_item_by_index(index, alt, &mut self.state);
        self.sync(changed);
        changed
    }

    pub fn expand_all(&mut self) {
        self.controller.expand_all(&mut self.state);
        self.sync(true);
    }

    pub fn collapse_all(&mut self) {
        self.controller.collapse_all(&mut self.state);
        self.sync(true);
    }
}
