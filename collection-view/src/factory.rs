use collection_virtualizer::ItemElement;

use crate::BindContext;

/// Creates and binds the row elements of a view.
///
/// Callbacks are not guarded: a panic unwinds through the operation that triggered it.
pub trait ItemFactory<T> {
    type Element: ItemElement;

    fn make_item(&mut self) -> Self::Element;

    fn bind_item(&mut self, element: &mut Self::Element, item: &T, context: &BindContext);

    /// The row stops showing the item that was at `index`.
    fn unbind_item(&mut self, element: &mut Self::Element, index: usize) {
        let _ = (element, index);
    }

    fn destroy_item(&mut self, element: Self::Element) {
        drop(element);
    }
}
