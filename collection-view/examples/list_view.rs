// Example: a selectable, reorderable inbox driven by keyboard and pointer input.
use collection_view::{
    BindContext, CollectionViewEvent, CollectionViewOptions, IdentifiedVec, ItemFactory,
    ListView, ListViewController, MemoryViewDataStore, NavigationMove, PointerContext,
    PointerEvent, Reorderable, Selectable, SelectionType, VirtualizedWindow,
};
use collection_virtualizer::{CollectionError, ItemElement};

#[derive(Debug, Default)]
struct Row {
    text: String,
    visible: bool,
}

impl ItemElement for Row {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_fixed_height(&mut self, _height: Option<u32>) {}
}

struct Subjects;

impl ItemFactory<String> for Subjects {
    type Element = Row;

    fn make_item(&mut self) -> Row {
        Row::default()
    }

    fn bind_item(&mut self, row: &mut Row, subject: &String, cx: &BindContext) {
        let marker = if cx.selected { '*' } else { ' ' };
        row.text = format!("{marker} {subject}");
    }
}

fn print_rows(view: &ListView<IdentifiedVec<String>, Subjects>) {
    for row in view.active_items().iter().filter(|r| r.is_bound()) {
        println!("  {}", row.element().text);
    }
}

fn main() -> Result<(), CollectionError> {
    let subjects: IdentifiedVec<String> = (0..500).map(|i| format!("message {i}")).collect();
    let options = CollectionViewOptions::default()
        .with_item_height(24)
        .with_selection_type(SelectionType::Multiple)
        .with_reorderable(true)
        .with_view_data_key("inbox");
    let mut view = ListView::new(ListViewController::new(subjects), Subjects, options)?;
    view.resize(120);

    view.handle_navigation(NavigationMove::Next, false);
    view.handle_navigation(NavigationMove::Next, true);
    view.handle_navigation(NavigationMove::Next, true);
    println!("selected={:?}", view.selected_indices());
    print_rows(&view);

    // Drag the first row below the third one.
    let mut cx = PointerContext::new();
    view.on_pointer_down(&mut cx, PointerEvent::new(0, 4.0));
    view.on_pointer_move(&mut cx, PointerEvent::new(0, 40.0));
    println!("dragging={:?}", view.dragged_index());
    let moved = view.on_pointer_up(&mut cx, PointerEvent::new(0, 60.0))?;
    println!("moved={moved}");
    print_rows(&view);

    view.remove_items(&[4, 1])?;
    view.handle_navigation(NavigationMove::Last, false);
    println!(
        "offset={} first_visible={}",
        view.scroll_offset(),
        view.first_visible_index()
    );

    let mut store = MemoryViewDataStore::new();
    view.save_view_data(&mut store);

    for event in view.take_events() {
        if let CollectionViewEvent::SelectionChanged { ids, .. } = event {
            println!("selection changed: ids={ids:?}");
        }
    }
    Ok(())
}
