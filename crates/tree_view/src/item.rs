use std::collections::HashMap;

use gpui::SharedString;

use crate::path::IndexPath;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct ItemFlags {
    selectable: bool,
    draggable: bool,
    droppable: bool,
    expandable: bool,
    droppable_into_children: bool,
    droppable_externals: bool,
}

/// A tree node with an opaque, caller-owned payload.
///
/// `id` must be unique across the whole tree: selection and expansion are keyed by it, never
/// by the node's position or address in memory. Every capability flag defaults to `false`.
#[derive(Clone, Debug)]
pub struct TreeItem<T> {
    pub id: SharedString,
    pub content: T,
    children: Option<Vec<TreeItem<T>>>,
    flags: ItemFlags,
}

impl<T> TreeItem<T> {
    pub fn new(id: impl Into<SharedString>, content: T) -> Self {
        Self {
            id: id.into(),
            content,
            children: None,
            flags: ItemFlags::default(),
        }
    }

    pub fn child(mut self, child: TreeItem<T>) -> Self {
        self.children.get_or_insert_with(Vec::new).push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = TreeItem<T>>) -> Self {
        self.children.get_or_insert_with(Vec::new).extend(children);
        self
    }

    /// Turn a leaf into a node with an (empty) child list.
    pub fn branch(mut self) -> Self {
        self.children.get_or_insert_with(Vec::new);
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.flags.selectable = selectable;
        self
    }

    pub fn draggable(mut self, draggable: bool) -> Self {
        self.flags.draggable = draggable;
        self
    }

    pub fn droppable(mut self, droppable: bool) -> Self {
        self.flags.droppable = droppable;
        self
    }

    pub fn expandable(mut self, expandable: bool) -> Self {
        self.flags.expandable = expandable;
        self
    }

    /// Control whether other nodes may be dropped as children of this node.
    pub fn droppable_into_children(mut self, droppable: bool) -> Self {
        self.flags.droppable_into_children = droppable;
        self
    }

    /// Control whether payloads from an external drag source may be dropped here.
    pub fn droppable_externals(mut self, droppable: bool) -> Self {
        self.flags.droppable_externals = droppable;
        self
    }

    #[inline]
    pub fn child_items(&self) -> &[TreeItem<T>] {
        self.children.as_deref().unwrap_or_default()
    }

    #[inline]
    pub fn child_items_mut(&mut self) -> Option<&mut Vec<TreeItem<T>>> {
        self.children.as_mut()
    }

    pub(crate) fn child_list_mut(&mut self) -> &mut Vec<TreeItem<T>> {
        self.children.get_or_insert_with(Vec::new)
    }

    /// `None` for a leaf, which is different from a branch with no children yet.
    #[inline]
    pub fn child_count(&self) -> Option<usize> {
        self.children.as_ref().map(Vec::len)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        !self.child_items().is_empty()
    }

    #[inline]
    pub fn is_selectable(&self) -> bool {
        self.flags.selectable
    }

    #[inline]
    pub fn is_draggable(&self) -> bool {
        self.flags.draggable
    }

    #[inline]
    pub fn is_droppable(&self) -> bool {
        self.flags.droppable
    }

    #[inline]
    pub fn is_expandable(&self) -> bool {
        self.flags.expandable
    }

    #[inline]
    pub fn accepts_children(&self) -> bool {
        self.flags.droppable_into_children
    }

    #[inline]
    pub fn accepts_externals(&self) -> bool {
        self.flags.droppable_externals
    }
}

/// Look up each of `ids` below `root`, depth first.
///
/// Returns one slot per requested id, in request order. A slot holds the first matching node
/// and its path relative to `root` (which itself is never matched), or `None` if the id is not
/// in the tree.
pub fn find_by_id<'a, T>(
    root: &'a TreeItem<T>,
    ids: &[SharedString],
) -> Vec<Option<(&'a TreeItem<T>, IndexPath)>> {
    let mut found = vec![None; ids.len()];
    let mut pending: HashMap<&str, Vec<usize>> = HashMap::with_capacity(ids.len());
    for (slot, id) in ids.iter().enumerate() {
        pending.entry(id.as_str()).or_default().push(slot);
    }

    let mut path = Vec::new();
    collect_matches(root.child_items(), &mut path, &mut pending, &mut found);
    found
}

/// Single-id form of [`find_by_id`].
pub fn find_item<'a, T>(
    root: &'a TreeItem<T>,
    id: &SharedString,
) -> Option<(&'a TreeItem<T>, IndexPath)> {
    fn walk<'a, T>(
        items: &'a [TreeItem<T>],
        id: &SharedString,
        path: &mut Vec<usize>,
    ) -> Option<(&'a TreeItem<T>, IndexPath)> {
        for (ix, item) in items.iter().enumerate() {
            path.push(ix);
            if item.id == *id {
                return Some((item, IndexPath::new(path.clone())));
            }
            if let Some(found) = walk(item.child_items(), id, path) {
                return Some(found);
            }
            path.pop();
        }
        None
    }

    walk(root.child_items(), id, &mut Vec::new())
}

fn collect_matches<'a, T>(
    items: &'a [TreeItem<T>],
    path: &mut Vec<usize>,
    pending: &mut HashMap<&str, Vec<usize>>,
    found: &mut [Option<(&'a TreeItem<T>, IndexPath)>],
) {
    for (ix, item) in items.iter().enumerate() {
        if pending.is_empty() {
            return;
        }
        path.push(ix);
        if let Some(slots) = pending.remove(item.id.as_str()) {
            let item_path = IndexPath::new(path.clone());
            for slot in slots {
                found[slot] = Some((item, item_path.clone()));
            }
        }
        collect_matches(item.child_items(), path, pending, found);
        path.pop();
    }
}
