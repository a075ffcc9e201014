//! Splicing helpers for callers that own the tree.
//!
//! The engine itself never mutates the tree; it only reports validated moves. These helpers
//! apply such a move to a caller-owned [`TreeItem`] so the new snapshot can be fed back in.

use crate::item::TreeItem;
use crate::path::{IndexPath, shift_after_removal};

pub fn node_at<'a, T>(root: &'a TreeItem<T>, path: &[usize]) -> Option<&'a TreeItem<T>> {
    let mut node = root;
    for &ix in path {
        node = node.child_items().get(ix)?;
    }
    Some(node)
}

pub fn node_at_mut<'a, T>(root: &'a mut TreeItem<T>, path: &[usize]) -> Option<&'a mut TreeItem<T>> {
    let mut node = root;
    for &ix in path {
        node = node.child_items_mut()?.get_mut(ix)?;
    }
    Some(node)
}

/// Parent of the node at `path`; `None` for the root or a dangling path.
pub fn parent_at<'a, T>(root: &'a TreeItem<T>, path: &[usize]) -> Option<&'a TreeItem<T>> {
    let (_, parent) = path.split_last()?;
    node_at(root, parent)
}

pub fn remove_at<T>(root: &mut TreeItem<T>, path: &[usize]) -> Option<TreeItem<T>> {
    let (&ix, parent) = path.split_last()?;
    let children = node_at_mut(root, parent)?.child_items_mut()?;
    if ix >= children.len() {
        return None;
    }
    Some(children.remove(ix))
}

/// Insert `item` at `path`, clamping the last segment to the parent's child count.
///
/// A leaf parent becomes a branch. Returns the path the item ended up at, or hands the item
/// back when the parent does not exist.
pub fn insert_at<T>(
    root: &mut TreeItem<T>,
    path: &[usize],
    item: TreeItem<T>,
) -> Result<IndexPath, TreeItem<T>> {
    let Some((&ix, parent_path)) = path.split_last() else {
        return Err(item);
    };
    let Some(parent) = node_at_mut(root, parent_path) else {
        return Err(item);
    };

    let children = parent.child_list_mut();
    let ix = ix.min(children.len());
    children.insert(ix, item);
    Ok(IndexPath::from(parent_path).child(ix))
}

/// Move the node at `source` to `dest`, where `dest` comes from [`crate::dest_index`].
///
/// The destination parent is resolved before the source is removed, so a parent that sits
/// after the source still receives the node. Moving the root, or a node into its own subtree,
/// is refused and leaves the tree untouched. Returns the node's new path.
pub fn apply_move<T>(root: &mut TreeItem<T>, source: &[usize], dest: &[usize]) -> Option<IndexPath> {
    let (&dest_ix, dest_parent) = dest.split_last()?;
    node_at(root, source)?;
    node_at(root, dest_parent)?;

    let parent_after = shift_after_removal(dest_parent, source)?;

    let item = remove_at(root, source)?;
    match insert_at(root, &parent_after.child(dest_ix), item) {
        Ok(landed) => Some(landed),
        Err(item) => {
            let restored = insert_at(root, source, item);
            debug_assert!(restored.is_ok(), "source parent disappeared during a move");
            None
        }
    }
}
