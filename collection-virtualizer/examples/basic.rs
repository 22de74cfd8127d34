// Example: fixed-height rows over a large collection.
use collection_virtualizer::{
    ItemBinder, ItemElement, ItemId, ScrollTarget, VirtualizationController,
    VirtualizationOptions, create_controller,
};

#[derive(Debug, Default)]
struct Label {
    text: String,
    visible: bool,
}

impl ItemElement for Label {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_fixed_height(&mut self, _height: Option<u32>) {}
}

struct Numbers {
    count: usize,
}

impl ItemBinder<Label> for Numbers {
    fn item_count(&self) -> usize {
        self.count
    }

    fn item_id(&self, index: usize) -> ItemId {
        index as ItemId
    }

    fn make_item(&mut self) -> Label {
        Label::default()
    }

    fn bind_item(&mut self, element: &mut Label, index: usize) {
        element.text = format!("row #{index}");
    }
}

fn main() {
    let mut numbers = Numbers { count: 1_000_000 };
    let options = VirtualizationOptions::default().with_item_height(20);
    let mut view = create_controller::<Label>(&options);
    view.resize(200, &mut numbers);
    view.on_scroll(123_456, 0, &mut numbers);

    println!("content_height={}", view.expected_content_height());
    println!("visible_range={:?}", view.visible_range());
    println!("rows_created={}", view.created_items());
    let first = view.active_items().first().map(|r| r.element().text.clone());
    println!("first_row={first:?}");

    view.scroll_to_item(ScrollTarget::Index(999_999), 0, &mut numbers);
    println!("after scroll_to_item: offset={}", view.scroll_offset());
}
