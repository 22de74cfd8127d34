use alloc::collections::BTreeMap;

use collection_virtualizer::Result;

use crate::{
    CollectionView, CollectionViewController, CollectionViewEvent, ItemFactory, Reorderable,
    Selectable, SelectionType, VirtualizedWindow,
};

/// Modifier keys held during a pointer or keyboard event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// The macOS command key; acts like `ctrl` for selection.
    pub command: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        command: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        command: false,
    };

    pub const CTRL: Self = Self {
        shift: false,
        ctrl: true,
        command: false,
    };

    /// Toggle-selection modifier.
    pub fn action_key(&self) -> bool {
        self.ctrl || self.command
    }
}

/// Keyboard navigation commands, already translated from key codes by the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationMove {
    Previous,
    Next,
    PageUp,
    PageDown,
    First,
    Last,
    SelectAll,
    Cancel,
    Submit,
}

pub type PointerId = u32;

/// A pointer event in viewport coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub pointer_id: PointerId,
    /// Distance from the top of the viewport.
    pub y: f32,
    pub modifiers: Modifiers,
    pub click_count: u32,
}

impl PointerEvent {
    pub fn new(pointer_id: PointerId, y: f32) -> Self {
        Self {
            pointer_id,
            y,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PointerPress {
    index: usize,
    origin_y: f32,
    dragging: bool,
}

/// Per-pointer press state, owned by the host and passed to every pointer handler.
///
/// Keeping it outside the view lets one dispatcher track several pointers (and several views)
/// without global state.
#[derive(Clone, Debug, Default)]
pub struct PointerContext {
    presses: BTreeMap<PointerId, PointerPress>,
}

impl PointerContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, pointer_id: PointerId) -> bool {
        self.presses.contains_key(&pointer_id)
    }

    pub fn is_dragging(&self, pointer_id: PointerId) -> bool {
        self.presses.get(&pointer_id).is_some_and(|p| p.dragging)
    }

    pub fn pressed_count(&self) -> usize {
        self.presses.len()
    }

    /// Forgets every press, e.g. when the window loses focus.
    pub fn clear(&mut self) {
        self.presses.clear();
    }
}

impl<C, F> CollectionView<C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
    F::Element: 'static,
{
    /// Index of the item under viewport position `y`, if there is one.
    pub fn index_at(&self, y: f32) -> Option<usize> {
        if !y.is_finite() || y < 0.0 {
            return None;
        }
        let position = self.scroll_offset().saturating_add(y as u64);
        let index = self.state.virtualizer.index_from_position(position);
        (index < self.controller.item_count()).then_some(index)
    }

    /// Applies a keyboard navigation command. Returns `true` if it was handled.
    ///
    /// Moves start from the most recently selected item; with `shift` on a multiple-selection
    /// view, the selection extends from the range origin instead of being replaced.
    pub fn handle_navigation(&mut self, nav: NavigationMove, shift: bool) -> bool {
        let count = self.controller.item_count();
        if !self.controller.has_valid_data()
            || count == 0
            || self.options.selection_type == SelectionType::None
        {
            return false;
        }

        let last = self.state.selection.last_index();
        let page = self.visible_range().len().saturating_sub(1).max(1);
        let target = match nav {
            NavigationMove::SelectAll => {
                if self.options.selection_type != SelectionType::Multiple {
                    return false;
                }
                self.select_all();
                return true;
            }
            NavigationMove::Cancel => {
                let had_selection = !self.state.selection.is_empty();
                self.clear_selection();
                return had_selection;
            }
            NavigationMove::Submit => {
                if self.state.selection.is_empty() {
                    return false;
                }
                let ids = self.state.selection.ids().to_vec();
                self.state.events.push(CollectionViewEvent::ItemsChosen(ids));
                return true;
            }
            NavigationMove::Previous => last.map_or(0, |i| i.saturating_sub(1)),
            NavigationMove::Next => last.map_or(0, |i| (i + 1).min(count - 1)),
            NavigationMove::PageUp => last.map_or(0, |i| i.saturating_sub(page)),
            NavigationMove::PageDown => last.map_or(0, |i| (i + page).min(count - 1)),
            NavigationMove::First => 0,
            NavigationMove::Last => count - 1,
        };

        vtrace!(?nav, target, shift, "CollectionView: navigation");
        if shift && self.options.selection_type == SelectionType::Multiple {
            let origin = self.range_origin_index().or(last).unwrap_or(target);
            if self.state.range_origin.is_none() {
                self.state.range_origin = self.controller.id_for_index(origin);
            }
            self.select_range(origin, target);
        } else {
            self.set_selection(&[target]);
        }
        self.scroll_to_item(target);
        true
    }

    /// A pointer went down at `event.y`. Returns `true` if it hit an item.
    ///
    /// A plain press selects the item, `ctrl`/`command` toggles it and `shift` selects the
    /// range from the range origin. A double click chooses the selection.
    pub fn on_pointer_down(&mut self, cx: &mut PointerContext, event: PointerEvent) -> bool {
        if cx.is_pressed(event.pointer_id) || !self.controller.has_valid_data() {
            return false;
        }
        let Some(index) = self.index_at(event.y) else {
            return false;
        };
        cx.presses.insert(
            event.pointer_id,
            PointerPress {
                index,
                origin_y: event.y,
                dragging: false,
            },
        );

        if event.click_count >= 2 {
            if !self.state.selection.contains_index(index) {
                self.set_selection(&[index]);
            }
            if !self.state.selection.is_empty() {
                let ids = self.state.selection.ids().to_vec();
                self.state.events.push(CollectionViewEvent::ItemsChosen(ids));
            }
            return true;
        }

        match self.options.selection_type {
            SelectionType::None => {}
            SelectionType::Single => self.set_selection(&[index]),
            SelectionType::Multiple => {
                if event.modifiers.action_key() {
                    if self.state.selection.contains_index(index) {
                        self.remove_from_selection(index);
                    } else {
                        self.add_to_selection(index);
                    }
                } else if event.modifiers.shift {
                    match self.range_origin_index() {
                        Some(origin) => self.select_range(origin, index),
                        None => self.set_selection(&[index]),
                    }
                } else {
                    self.set_selection(&[index]);
                }
            }
        }
        true
    }

    /// A pressed pointer moved. Past the drag threshold, a press on a reorderable view turns
    /// into a drag. Returns `true` while this pointer drags.
    pub fn on_pointer_move(&mut self, cx: &mut PointerContext, event: PointerEvent) -> bool {
        let Some(press) = cx.presses.get_mut(&event.pointer_id) else {
            return false;
        };
        if !press.dragging {
            if !self.options.reorderable
                || (event.y - press.origin_y).abs() < self.options.drag_threshold
            {
                return false;
            }
            if !self.start_drag(press.index) {
                return false;
            }
            press.dragging = true;
        }
        if let Some(index) = self.index_at(event.y) {
            self.drag_over(index);
        }
        true
    }

    /// A pressed pointer was released. Returns `true` if this completed a drag that moved an
    /// item.
    pub fn on_pointer_up(&mut self, cx: &mut PointerContext, event: PointerEvent) -> Result<bool> {
        let Some(press) = cx.presses.remove(&event.pointer_id) else {
            return Ok(false);
        };
        if !press.dragging {
            return Ok(false);
        }
        if let Some(index) = self.index_at(event.y) {
            self.drag_over(index);
        }
        self.complete_drag()
    }

    /// The press was lost (capture released, window hidden). A running drag is cancelled.
    pub fn on_pointer_cancel(&mut self, cx: &mut PointerContext, pointer_id: PointerId) {
        if cx.presses.remove(&pointer_id).is_some_and(|p| p.dragging) {
            self.cancel_drag();
        }
    }
}
