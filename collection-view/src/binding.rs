use collection_virtualizer::{ItemBinder, ItemId, Selection};

use crate::{CollectionViewController, ItemFactory};

/// Bridges a view controller and an item factory into the binder the virtualizer drives.
pub(crate) struct Binding<'a, C, F> {
    controller: &'a C,
    factory: &'a mut F,
    selection: &'a Selection,
}

impl<'a, C, F> Binding<'a, C, F> {
    pub(crate) fn new(controller: &'a C, factory: &'a mut F, selection: &'a Selection) -> Self {
        Self {
            controller,
            factory,
            selection,
        }
    }
}

impl<C, F> ItemBinder<F::Element> for Binding<'_, C, F>
where
    C: CollectionViewController,
    F: ItemFactory<C::Item>,
{
    fn item_count(&self) -> usize {
        self.controller.item_count()
    }

    fn item_id(&self, index: usize) -> ItemId {
        self.controller
            .id_for_index(index)
            .unwrap_or(index as ItemId)
    }

    fn make_item(&mut self) -> F::Element {
        self.factory.make_item()
    }

    fn bind_item(&mut self, element: &mut F::Element, index: usize) {
        let Some(item) = self.controller.item(index) else {
            return;
        };
        let mut context = self.controller.bind_context(index);
        context.selected = self.selection.contains_id(context.id);
        self.factory.bind_item(element, item, &context);
    }

    fn unbind_item(&mut self, element: &mut F::Element, index: usize) {
        self.factory.unbind_item(element, index);
    }

    fn destroy_item(&mut self, element: F::Element) {
        self.factory.destroy_item(element);
    }
}
