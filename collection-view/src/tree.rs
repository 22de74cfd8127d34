use alloc::vec;
use alloc::vec::Vec;

use collection_virtualizer::{CollectionError, IdMap, IdSet, ItemId, Result};

use crate::{BindContext, CollectionListener, CollectionViewController};

/// Input shape for building a tree: an item and its children, recursively.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeViewItemData<T> {
    pub id: ItemId,
    pub data: T,
    pub children: Vec<TreeViewItemData<T>>,
}

impl<T> TreeViewItemData<T> {
    pub fn new(id: ItemId, data: T) -> Self {
        Self {
            id,
            data,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<TreeViewItemData<T>>) -> Self {
        self.children = children;
        self
    }
}

/// A node of the tree as stored by the controller.
#[derive(Clone, Debug)]
pub struct TreeItem<T> {
    id: ItemId,
    parent_id: Option<ItemId>,
    children_ids: Vec<ItemId>,
    data: T,
}

impl<T> TreeItem<T> {
    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn parent_id(&self) -> Option<ItemId> {
        self.parent_id
    }

    pub fn children_ids(&self) -> &[ItemId] {
        &self.children_ids
    }

    pub fn has_children(&self) -> bool {
        !self.children_ids.is_empty()
    }

    pub fn data(&self) -> &T {
        &self.data
    }
}

/// One visible row of the flattened tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeItemWrapper {
    pub id: ItemId,
    pub depth: usize,
}

/// View controller over a tree of items.
///
/// The virtualizer sees the tree as the flat list of [`TreeItemWrapper`]s: a depth-first,
/// pre-order walk that only descends into expanded nodes. Expanding or collapsing a visible
/// node splices its subtree in or out of that list instead of regenerating it.
#[derive(Clone, Debug)]
pub struct TreeViewController<T> {
    items: IdMap<TreeItem<T>>,
    root_ids: Vec<ItemId>,
    expanded: IdSet,
    wrappers: Vec<TreeItemWrapper>,
    index_by_id: IdMap<usize>,
}

impl<T> Default for TreeViewController<T> {
    fn default() -> Self {
        Self {
            items: IdMap::default(),
            root_ids: Vec::new(),
            expanded: IdSet::default(),
            wrappers: Vec::new(),
            index_by_id: IdMap::default(),
        }
    }
}

impl<T> TreeViewController<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_items(roots: Vec<TreeViewItemData<T>>) -> Result<Self> {
        let mut tree = Self::new();
        tree.set_root_items(roots, &mut ())?;
        Ok(tree)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    pub fn get_item(&self, id: ItemId) -> Option<&TreeItem<T>> {
        self.items.get(&id)
    }

    pub fn get_data(&self, id: ItemId) -> Option<&T> {
        self.items.get(&id).map(|item| &item.data)
    }

    pub fn get_data_mut(&mut self, id: ItemId) -> Option<&mut T> {
        self.items.get_mut(&id).map(|item| &mut item.data)
    }

    pub fn root_ids(&self) -> &[ItemId] {
        &self.root_ids
    }

    /// Every item id, depth-first in tree order, collapsed subtrees included.
    pub fn all_item_ids(&self) -> Vec<ItemId> {
        let mut ids = Vec::with_capacity(self.items.len());
        let mut stack: Vec<ItemId> = self.root_ids.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            ids.push(id);
            stack.extend(self.children_ids(id).iter().rev());
        }
        ids
    }

    pub fn children_ids(&self, id: ItemId) -> &[ItemId] {
        self.items
            .get(&id)
            .map_or(&[][..], |item| &item.children_ids[..])
    }

    pub fn parent_id(&self, id: ItemId) -> Option<ItemId> {
        self.items.get(&id)?.parent_id
    }

    pub fn has_children(&self, id: ItemId) -> bool {
        self.items.get(&id).is_some_and(TreeItem::has_children)
    }

    pub fn is_expanded(&self, id: ItemId) -> bool {
        self.expanded.contains(&id)
    }

    /// The visible rows, in display order.
    pub fn wrappers(&self) -> &[TreeItemWrapper] {
        &self.wrappers
    }

    /// `true` if `id` is a (transitive) child of `ancestor`.
    pub fn is_descendant_of(&self, id: ItemId, ancestor: ItemId) -> bool {
        let mut cur = self.parent_id(id);
        while let Some(p) = cur {
            if p == ancestor {
                return true;
            }
            cur = self.parent_id(p);
        }
        false
    }

    /// Replaces the whole tree. Expanded state is kept for ids that still exist.
    pub fn set_root_items(
        &mut self,
        roots: Vec<TreeViewItemData<T>>,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        let mut seen = IdSet::default();
        for root in &roots {
            collect_new_ids(root, &mut seen, &IdMap::default())?;
        }

        self.items.clear();
        self.root_ids.clear();
        self.expanded.retain(|id| seen.contains(id));
        for root in roots {
            self.root_ids.push(root.id);
            self.insert_subtree(root, None);
        }
        self.regenerate_wrappers();
        vdebug!(
            items = self.items.len(),
            visible = self.wrappers.len(),
            "TreeViewController: root items set"
        );
        listener.items_reset();
        listener.items_source_size_changed();
        Ok(())
    }

    /// Rebuilds the flattened wrapper list from scratch.
    pub fn regenerate_wrappers(&mut self) {
        let mut wrappers = Vec::with_capacity(self.wrappers.len());
        let mut stack: Vec<TreeItemWrapper> = self
            .root_ids
            .iter()
            .rev()
            .map(|&id| TreeItemWrapper { id, depth: 0 })
            .collect();
        while let Some(wrapper) = stack.pop() {
            wrappers.push(wrapper);
            self.push_visible_children(wrapper, &mut stack);
        }
        self.wrappers = wrappers;
        self.reindex();
    }

    /// Expands the node shown at `index`; with `all`, every descendant with children too.
    ///
    /// Returns `false` if nothing changed.
    pub fn expand_item_by_index(
        &mut self,
        index: usize,
        all: bool,
        listener: &mut dyn CollectionListener,
    ) -> bool {
        let Some(&TreeItemWrapper { id, depth }) = self.wrappers.get(index) else {
            return false;
        };
        if !self.has_children(id) {
            return false;
        }
        let mut changed = Vec::new();
        if self.expanded.insert(id) {
            changed.push(id);
        }
        if all {
            self.set_descendants_expanded(id, true, &mut changed);
        }
        if changed.is_empty() {
            return false;
        }

        let run = self.visible_run(index);
        if run > 0 {
            let removed: Vec<usize> = (index + 1..=index + run).collect();
            listener.items_removed(&removed);
            self.wrappers.drain(index + 1..=index + run);
        }
        let subtree = self.subtree_wrappers(id, depth);
        let added: Vec<usize> = (index + 1..=index + subtree.len()).collect();
        let tail = self.wrappers.split_off(index + 1);
        self.wrappers.extend(subtree);
        self.wrappers.extend(tail);
        self.reindex();

        vtrace!(index, id, added = added.len(), "TreeViewController: expand");
        if !added.is_empty() {
            listener.items_added(&added);
        }
        for id in changed {
            listener.item_expanded_changed(id, true);
        }
        listener.items_source_size_changed();
        true
    }

    /// Collapses the node shown at `index`; with `all`, every descendant too.
    ///
    /// Returns `false` if nothing changed.
    pub fn collapse_item_by_index(
        &mut self,
        index: usize,
        all: bool,
        listener: &mut dyn CollectionListener,
    ) -> bool {
        let Some(&TreeItemWrapper { id, .. }) = self.wrappers.get(index) else {
            return false;
        };
        let mut changed = Vec::new();
        if self.expanded.remove(&id) {
            changed.push(id);
        }
        if all {
            self.set_descendants_expanded(id, false, &mut changed);
        }
        if changed.is_empty() {
            return false;
        }

        let run = self.visible_run(index);
        if run > 0 {
            let removed: Vec<usize> = (index + 1..=index + run).collect();
            listener.items_removed(&removed);
            self.wrappers.drain(index + 1..=index + run);
            self.reindex();
        }

        vtrace!(index, id, removed = run, "TreeViewController: collapse");
        for id in changed {
            listener.item_expanded_changed(id, false);
        }
        listener.items_source_size_changed();
        true
    }

    pub fn toggle_item_by_index(
        &mut self,
        index: usize,
        all: bool,
        listener: &mut dyn CollectionListener,
    ) -> bool {
        let Some(wrapper) = self.wrappers.get(index) else {
            return false;
        };
        if self.is_expanded(wrapper.id) {
            self.collapse_item_by_index(index, all, listener)
        } else {
            self.expand_item_by_index(index, all, listener)
        }
    }

    /// Expands `id`, first expanding any collapsed ancestor so that it becomes visible.
    pub fn expand_item(
        &mut self,
        id: ItemId,
        all: bool,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        if !self.contains(id) {
            return Err(CollectionError::UnknownItemId(id));
        }
        let mut changed = Vec::new();
        let mut ancestor = self.parent_id(id);
        while let Some(p) = ancestor {
            if self.expanded.insert(p) {
                changed.push(p);
            }
            ancestor = self.parent_id(p);
        }
        if changed.is_empty() {
            if let Some(index) = self.index_for_id(id) {
                self.expand_item_by_index(index, all, listener);
            }
            return Ok(());
        }

        if self.has_children(id) && self.expanded.insert(id) {
            changed.push(id);
        }
        if all {
            self.set_descendants_expanded(id, true, &mut changed);
        }
        self.regenerate_wrappers();
        listener.items_reset();
        for id in changed {
            listener.item_expanded_changed(id, true);
        }
        listener.items_source_size_changed();
        Ok(())
    }

    pub fn collapse_item(
        &mut self,
        id: ItemId,
        all: bool,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        if !self.contains(id) {
            return Err(CollectionError::UnknownItemId(id));
        }
        if let Some(index) = self.index_for_id(id) {
            self.collapse_item_by_index(index, all, listener);
            return Ok(());
        }

        // Hidden: only the expanded state changes.
        let mut changed = Vec::new();
        if self.expanded.remove(&id) {
            changed.push(id);
        }
        if all {
            self.set_descendants_expanded(id, false, &mut changed);
        }
        for id in changed {
            listener.item_expanded_changed(id, false);
        }
        Ok(())
    }

    pub fn expand_all(&mut self, listener: &mut dyn CollectionListener) {
        let mut changed: Vec<ItemId> = self
            .items
            .values()
            .filter(|item| item.has_children() && !self.expanded.contains(&item.id))
            .map(|item| item.id)
            .collect();
        if changed.is_empty() {
            return;
        }
        changed.sort_unstable();
        self.expanded.extend(changed.iter().copied());
        self.regenerate_wrappers();
        listener.items_reset();
        for id in changed {
            listener.item_expanded_changed(id, true);
        }
        listener.items_source_size_changed();
    }

    pub fn collapse_all(&mut self, listener: &mut dyn CollectionListener) {
        if self.expanded.is_empty() {
            return;
        }
        let mut changed: Vec<ItemId> = core::mem::take(&mut self.expanded).into_iter().collect();
        changed.sort_unstable();
        self.regenerate_wrappers();
        listener.items_reset();
        for id in changed {
            listener.item_expanded_changed(id, false);
        }
        listener.items_source_size_changed();
    }

    /// Adds `item` (with its children) under `parent`, or as a root with `None`.
    ///
    /// `child_index` defaults to the end of the sibling list and is clamped to it.
    pub fn add_item(
        &mut self,
        item: TreeViewItemData<T>,
        parent: Option<ItemId>,
        child_index: Option<usize>,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        if let Some(p) = parent.filter(|p| !self.contains(*p)) {
            return Err(CollectionError::UnknownItemId(p));
        }
        collect_new_ids(&item, &mut IdSet::default(), &self.items)?;

        let id = item.id;
        self.insert_subtree(item, parent);
        let siblings = self.siblings_mut(parent)?;
        let pos = child_index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(pos, id);

        let parent_index = match parent {
            None => None,
            Some(p) => match self.index_for_id(p) {
                Some(index) if self.is_expanded(p) => Some(index),
                // Parent hidden or collapsed: nothing becomes visible.
                _ => {
                    listener.items_source_size_changed();
                    return Ok(());
                }
            },
        };
        let depth = parent_index.map_or(0, |i| self.wrappers[i].depth + 1);
        let at = self.wrapper_insert_position(parent, parent_index, pos);
        let mut inserted = vec![TreeItemWrapper { id, depth }];
        if self.is_expanded(id) {
            inserted.extend(self.subtree_wrappers(id, depth));
        }
        let added: Vec<usize> = (at..at + inserted.len()).collect();
        let tail = self.wrappers.split_off(at);
        self.wrappers.extend(inserted);
        self.wrappers.extend(tail);
        self.reindex();

        vdebug!(id, at, "TreeViewController: item added");
        listener.items_added(&added);
        listener.items_source_size_changed();
        Ok(())
    }

    /// Removes `id` and its whole subtree. Returns `false` if `id` is unknown.
    pub fn try_remove_item(&mut self, id: ItemId, listener: &mut dyn CollectionListener) -> bool {
        let Some(parent) = self.items.get(&id).map(|item| item.parent_id) else {
            return false;
        };
        if let Some(index) = self.index_for_id(id) {
            let run = 1 + self.visible_run(index);
            let removed: Vec<usize> = (index..index + run).collect();
            listener.items_removed(&removed);
            self.wrappers.drain(index..index + run);
            self.reindex();
        }
        if let Ok(siblings) = self.siblings_mut(parent) {
            siblings.retain(|&c| c != id);
        }
        self.remove_subtree(id);

        vdebug!(id, "TreeViewController: item removed");
        listener.items_source_size_changed();
        true
    }

    /// Re-parents `id` under `new_parent` (a root with `None`) at `child_index`.
    pub fn move_item(
        &mut self,
        id: ItemId,
        new_parent: Option<ItemId>,
        child_index: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        let Some(old_parent) = self.items.get(&id).map(|item| item.parent_id) else {
            return Err(CollectionError::UnknownItemId(id));
        };
        if let Some(p) = new_parent {
            if !self.contains(p) {
                return Err(CollectionError::UnknownItemId(p));
            }
            if p == id || self.is_descendant_of(p, id) {
                return Err(CollectionError::CyclicMove { id, parent: p });
            }
        }

        self.siblings_mut(old_parent)?.retain(|&c| c != id);
        let siblings = self.siblings_mut(new_parent)?;
        let pos = child_index.min(siblings.len());
        siblings.insert(pos, id);
        if let Some(item) = self.items.get_mut(&id) {
            item.parent_id = new_parent;
        }
        self.regenerate_wrappers();

        vdebug!(id, ?new_parent, pos, "TreeViewController: item moved");
        listener.items_reset();
        listener.items_source_size_changed();
        Ok(())
    }

    fn insert_subtree(&mut self, root: TreeViewItemData<T>, parent: Option<ItemId>) {
        let mut stack = vec![(root, parent)];
        while let Some((node, parent_id)) = stack.pop() {
            let TreeViewItemData { id, data, children } = node;
            let children_ids = children.iter().map(|c| c.id).collect();
            self.items.insert(
                id,
                TreeItem {
                    id,
                    parent_id,
                    children_ids,
                    data,
                },
            );
            stack.extend(children.into_iter().map(|c| (c, Some(id))));
        }
    }

    fn remove_subtree(&mut self, id: ItemId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            self.expanded.remove(&id);
            if let Some(item) = self.items.remove(&id) {
                stack.extend(item.children_ids);
            }
        }
    }

    fn siblings_mut(&mut self, parent: Option<ItemId>) -> Result<&mut Vec<ItemId>> {
        match parent {
            None => Ok(&mut self.root_ids),
            Some(p) => self
                .items
                .get_mut(&p)
                .map(|item| &mut item.children_ids)
                .ok_or(CollectionError::UnknownItemId(p)),
        }
    }

    fn siblings(&self, parent: Option<ItemId>) -> &[ItemId] {
        match parent {
            None => &self.root_ids,
            Some(p) => self.children_ids(p),
        }
    }

    fn push_visible_children(&self, wrapper: TreeItemWrapper, stack: &mut Vec<TreeItemWrapper>) {
        if !self.expanded.contains(&wrapper.id) {
            return;
        }
        let depth = wrapper.depth + 1;
        stack.extend(
            self.children_ids(wrapper.id)
                .iter()
                .rev()
                .map(|&id| TreeItemWrapper { id, depth }),
        );
    }

    /// Visible descendants of the expanded node `id` shown at `depth`.
    fn subtree_wrappers(&self, id: ItemId, depth: usize) -> Vec<TreeItemWrapper> {
        let mut out = Vec::new();
        let mut stack = Vec::new();
        self.push_visible_children(TreeItemWrapper { id, depth }, &mut stack);
        while let Some(wrapper) = stack.pop() {
            out.push(wrapper);
            self.push_visible_children(wrapper, &mut stack);
        }
        out
    }

    /// Number of wrappers right after `index` that are deeper than it.
    fn visible_run(&self, index: usize) -> usize {
        let Some(depth) = self.wrappers.get(index).map(|w| w.depth) else {
            return 0;
        };
        self.wrappers[index + 1..]
            .iter()
            .take_while(|w| w.depth > depth)
            .count()
    }

    /// Wrapper index for the child at `pos` of `parent` (already inserted in the sibling list).
    fn wrapper_insert_position(
        &self,
        parent: Option<ItemId>,
        parent_index: Option<usize>,
        pos: usize,
    ) -> usize {
        let siblings = self.siblings(parent);
        let prev = pos.checked_sub(1).and_then(|i| siblings.get(i));
        match prev.and_then(|&s| self.index_for_id(s)) {
            Some(prev_index) => prev_index + 1 + self.visible_run(prev_index),
            None => parent_index.map_or(0, |i| i + 1),
        }
    }

    fn set_descendants_expanded(&mut self, id: ItemId, expanded: bool, changed: &mut Vec<ItemId>) {
        let mut stack: Vec<ItemId> = self.children_ids(id).to_vec();
        while let Some(id) = stack.pop() {
            let children = self.children_ids(id);
            if children.is_empty() {
                continue;
            }
            stack.extend_from_slice(children);
            let flipped = if expanded {
                self.expanded.insert(id)
            } else {
                self.expanded.remove(&id)
            };
            if flipped {
                changed.push(id);
            }
        }
    }

    fn reindex(&mut self) {
        self.index_by_id.clear();
        for (index, wrapper) in self.wrappers.iter().enumerate() {
            self.index_by_id.insert(wrapper.id, index);
        }
    }
}

/// Collects the ids of `root`'s subtree into `seen`, rejecting ids that repeat or already
/// exist in `existing`.
fn collect_new_ids<T>(
    root: &TreeViewItemData<T>,
    seen: &mut IdSet,
    existing: &IdMap<TreeItem<T>>,
) -> Result<()> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if existing.contains_key(&node.id) || !seen.insert(node.id) {
            return Err(CollectionError::DuplicateItemId(node.id));
        }
        stack.extend(node.children.iter());
    }
    Ok(())
}

impl<T> CollectionViewController for TreeViewController<T> {
    type Item = T;

    fn item_count(&self) -> usize {
        self.wrappers.len()
    }

    fn item(&self, index: usize) -> Option<&T> {
        let wrapper = self.wrappers.get(index)?;
        self.get_data(wrapper.id)
    }

    fn id_for_index(&self, index: usize) -> Option<ItemId> {
        self.wrappers.get(index).map(|w| w.id)
    }

    fn index_for_id(&self, id: ItemId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    fn bind_context(&self, index: usize) -> BindContext {
        let Some(&TreeItemWrapper { id, depth }) = self.wrappers.get(index) else {
            return BindContext {
                index,
                ..BindContext::default()
            };
        };
        BindContext {
            index,
            id,
            depth,
            has_children: self.has_children(id),
            expanded: self.is_expanded(id),
            selected: false,
        }
    }

    /// Moves the item shown at `from` next to the item shown at `to`, adopting its parent.
    fn reorder_item(
        &mut self,
        from: usize,
        to: usize,
        listener: &mut dyn CollectionListener,
    ) -> Result<()> {
        let count = self.wrappers.len();
        for index in [from, to] {
            if index >= count {
                return Err(CollectionError::IndexOutOfRange { index, count });
            }
        }
        if from == to {
            return Ok(());
        }
        let id = self.wrappers[from].id;
        let target = self.wrappers[to].id;
        let parent = self.parent_id(target);
        if let Some(p) = parent.filter(|&p| p == id || self.is_descendant_of(p, id)) {
            return Err(CollectionError::CyclicMove { id, parent: p });
        }

        let siblings = self.siblings(parent);
        let mut pos = siblings
            .iter()
            .position(|&s| s == target)
            .unwrap_or(siblings.len());
        // The moved item leaves the same sibling list first.
        if siblings[..pos].contains(&id) {
            pos -= 1;
        }
        if from < to {
            pos += 1;
        }
        self.move_item(id, parent, pos, listener)
    }

    fn expanded_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self.expanded.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn restore_expanded_ids(&mut self, ids: &[ItemId], listener: &mut dyn CollectionListener) {
        self.expanded.clear();
        self.expanded
            .extend(ids.iter().copied().filter(|id| self.items.contains_key(id)));
        self.regenerate_wrappers();
        listener.items_reset();
        listener.items_source_size_changed();
    }
}
