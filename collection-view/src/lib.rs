//! Headless list and tree views on top of `collection-virtualizer`.
//!
//! A [`CollectionView`] pairs a data controller with an [`ItemFactory`]:
//!
//! - [`ListViewController`] shows a flat [`ItemsSource`] (`Vec<T>`, `Box<[T]>`,
//!   [`IdentifiedVec`]);
//! - [`TreeViewController`] shows a tree flattened to its visible nodes, with expand and
//!   collapse.
//!
//! On top of the recycled-row window the view adds id-keyed selection, keyboard navigation,
//! pointer handling, drag reordering and persisted view state. It never draws anything: the
//! host feeds it viewport sizes, scroll offsets, measured row geometry and input, and renders
//! the rows in [`CollectionView::active_items`].
//!
//! ```
//! use collection_view::{
//!     BindContext, CollectionViewOptions, ItemFactory, ListView, ListViewController,
//!     Selectable, VirtualizedWindow,
//! };
//! use collection_virtualizer::ItemElement;
//!
//! #[derive(Default)]
//! struct Label {
//!     text: String,
//!     visible: bool,
//! }
//!
//! impl ItemElement for Label {
//!     fn set_visible(&mut self, visible: bool) {
//!         self.visible = visible;
//!     }
//!
//!     fn set_fixed_height(&mut self, _height: Option<u32>) {}
//! }
//!
//! struct Labels;
//!
//! impl ItemFactory<u32> for Labels {
//!     type Element = Label;
//!
//!     fn make_item(&mut self) -> Label {
//!         Label::default()
//!     }
//!
//!     fn bind_item(&mut self, label: &mut Label, item: &u32, cx: &BindContext) {
//!         label.text = format!("{}{item}", if cx.selected { "> " } else { "" });
//!     }
//! }
//!
//! let source: Vec<u32> = (0..1_000).collect();
//! let mut view: ListView<Vec<u32>, Labels> = ListView::new(
//!     ListViewController::new(source),
//!     Labels,
//!     CollectionViewOptions::default().with_item_height(20),
//! )
//! .unwrap();
//! view.resize(200);
//! view.set_selection(&[3]);
//! assert_eq!(view.selected_index(), Some(3));
//! assert!(view.active_items().iter().any(|row| row.element().text == "> 3"));
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod binding;
mod capabilities;
mod controller;
mod events;
mod factory;
mod input;
mod list;
mod options;
mod persist;
mod source;
mod tree;
mod view;


pub use capabilities::{Reorderable, Selectable, VirtualizedWindow};
pub use controller::{BindContext, CollectionListener, CollectionViewController};
pub use events::CollectionViewEvent;
pub use factory::ItemFactory;
pub use input::{Modifiers, NavigationMove, PointerContext, PointerEvent, PointerId};
pub use list::ListViewController;
pub use options::{CollectionViewOptions, DEFAULT_DRAG_THRESHOLD, SelectionType};
pub use persist::{MemoryViewDataStore, PersistedViewState, ViewDataStore};
pub use source::{IdentifiedVec, ItemsSource};
pub use tree::{TreeItem, TreeItemWrapper, TreeViewController, TreeViewItemData};
pub use view::{CollectionView, ListView, TreeView};
