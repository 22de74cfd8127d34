// Example: a file tree with expand/collapse, edits and persisted expansion state.
use collection_view::{
    BindContext, CollectionViewOptions, ItemFactory, MemoryViewDataStore, Selectable, TreeView,
    TreeViewController, TreeViewItemData, VirtualizedWindow,
};
use collection_virtualizer::{CollectionError, ItemElement, VirtualizationMethod};

#[derive(Debug, Default)]
struct Node {
    text: String,
    visible: bool,
}

impl ItemElement for Node {
    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn set_fixed_height(&mut self, _height: Option<u32>) {}
}

struct Names;

impl ItemFactory<&'static str> for Names {
    type Element = Node;

    fn make_item(&mut self) -> Node {
        Node::default()
    }

    fn bind_item(&mut self, node: &mut Node, name: &&'static str, cx: &BindContext) {
        let arrow = match (cx.has_children, cx.expanded) {
            (false, _) => ' ',
            (true, false) => '>',
            (true, true) => 'v',
        };
        node.text = format!("{:indent$}{arrow} {name}", "", indent = cx.depth * 2);
    }
}

fn print_tree(view: &TreeView<&'static str, Names>) {
    for row in view.active_items().iter().filter(|r| r.is_bound()) {
        println!("  {}", row.element().text);
    }
}

fn main() -> Result<(), CollectionError> {
    let roots = vec![
        TreeViewItemData::new(1, "src").with_children(vec![
            TreeViewItemData::new(2, "lib.rs"),
            TreeViewItemData::new(3, "view")
                .with_children(vec![TreeViewItemData::new(4, "mod.rs")]),
        ]),
        TreeViewItemData::new(5, "Cargo.toml"),
    ];
    let controller = TreeViewController::with_root_items(roots)?;
    let options = CollectionViewOptions::default()
        .with_method(VirtualizationMethod::DynamicHeight)
        .with_view_data_key("files");
    let mut view = TreeView::new(controller, Names, options)?;
    view.resize(200);
    print_tree(&view);

    view.expand_item(4, false)?;
    println!("after expanding the parents of mod.rs:");
    print_tree(&view);

    view.add_item(TreeViewItemData::new(6, "tests.rs"), Some(1), None)?;
    view.set_selection(&[1]);
    println!("selected={:?}", view.selected_ids());

    let mut store = MemoryViewDataStore::new();
    view.save_view_data(&mut store);
    view.collapse_all();
    println!("collapsed:");
    print_tree(&view);

    view.restore_view_data(&store);
    println!("restored:");
    print_tree(&view);
    println!("first_visible={}", view.first_visible_index());
    Ok(())
}
