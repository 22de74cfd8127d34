use crate::ItemId;

/// The host's visual row, as far as virtualization needs it.
///
/// The element itself is opaque: virtualization only toggles display, pushes a fixed height
/// in fixed-height mode, and flags drag ghosts. Attach/detach hooks run when a row enters or
/// leaves the active window.
pub trait ItemElement {
    /// `false` is the "not displayed" state: layout and rendering skip the row.
    fn set_visible(&mut self, visible: bool);

    /// `Some(h)` pins the row height (fixed-height mode); `None` lets content decide.
    fn set_fixed_height(&mut self, height: Option<u32>);

    fn set_drag_ghost(&mut self, ghost: bool) {
        let _ = ghost;
    }

    /// Called before the row is attached to the content container.
    fn pre_attach(&mut self) {}

    /// Called when the row leaves the content container and returns to the pool.
    fn detach(&mut self) {}
}

/// Everything a virtualization controller needs from the collection it displays.
///
/// Item construction and binding errors are not caught: a panicking callback unwinds
/// through the refresh that triggered it.
pub trait ItemBinder<E> {
    fn item_count(&self) -> usize;

    fn item_id(&self, index: usize) -> ItemId;

    fn make_item(&mut self) -> E;

    fn bind_item(&mut self, element: &mut E, index: usize);

    fn unbind_item(&mut self, element: &mut E, index: usize) {
        let _ = (element, index);
    }

    fn destroy_item(&mut self, element: E) {
        drop(element);
    }
}
