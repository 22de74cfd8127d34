// Example: dynamic measurement and stick-to-bottom.
use collection_virtualizer::{
    DynamicHeightController, ItemBinder, ItemElement, ItemId, ResolvedRect, ScrollTarget,
    VirtualizationController, VirtualizationMethod, VirtualizationOptions,
};

#[derive(Debug, Default)]
struct Message {
    lines: usize,
}

impl ItemElement for Message {
    fn set_visible(&mut self, _visible: bool) {}

    fn set_fixed_height(&mut self, _height: Option<u32>) {}
}

struct Chat {
    lines: Vec<usize>,
}

impl ItemBinder<Message> for Chat {
    fn item_count(&self) -> usize {
        self.lines.len()
    }

    fn item_id(&self, index: usize) -> ItemId {
        index as ItemId
    }

    fn make_item(&mut self) -> Message {
        Message::default()
    }

    fn bind_item(&mut self, element: &mut Message, index: usize) {
        element.lines = self.lines[index];
    }
}

fn main() {
    let mut chat = Chat {
        lines: (0..200).map(|i| 1 + i % 4).collect(),
    };
    let options =
        VirtualizationOptions::new(VirtualizationMethod::DynamicHeight).with_item_height(16);
    let mut view = DynamicHeightController::<Message>::new(&options);
    view.resize(160, &mut chat);
    view.scroll_to_item(ScrollTarget::End, 0, &mut chat);
    println!(
        "before: off={} total={} range={:?}",
        view.scroll_offset(),
        view.expected_content_height(),
        view.visible_range()
    );

    // Pretend the layout engine resolved every bound row: 16px per text line.
    let mut now = 0;
    while view.waiting_for_layout().next().is_some() {
        let bound: Vec<_> = view.waiting_for_layout().collect();
        for index in bound {
            let height = (chat.lines[index] * 16) as f32;
            let rect = ResolvedRect::new(0.0, 0.0, 300.0, height);
            view.on_geometry_changed(index, rect, now, &mut chat);
        }
        now += 16;
        view.tick(now, &mut chat);
    }

    // Pinned at the end before measuring, so still pinned after.
    println!(
        "after: off={} max={} total={} range={:?}",
        view.scroll_offset(),
        view.max_scroll_offset(),
        view.expected_content_height(),
        view.visible_range()
    );
}
