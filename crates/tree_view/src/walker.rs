use crate::controller::HoverState;
use crate::item::TreeItem;
use crate::path::IndexPath;

/// A node reached by [`walk_visible`].
#[derive(Debug)]
pub struct VisibleNode<'a, T> {
    pub item: &'a TreeItem<T>,
    pub parent: &'a TreeItem<T>,
    pub path: IndexPath,
    pub depth: usize,
}

/// Depth-first pre-order walk over every node not hidden behind a collapsed ancestor.
///
/// The root itself is not visited and its children are always visible.
pub fn walk_visible<'a, T>(
    root: &'a TreeItem<T>,
    is_expanded: impl Fn(&TreeItem<T>) -> bool,
    mut visit: impl FnMut(VisibleNode<'a, T>),
) {
    let mut path = Vec::new();
    walk_children(root, &is_expanded, &mut visit, &mut path);
}

fn walk_children<'a, T>(
    parent: &'a TreeItem<T>,
    is_expanded: &impl Fn(&TreeItem<T>) -> bool,
    visit: &mut impl FnMut(VisibleNode<'a, T>),
    path: &mut Vec<usize>,
) {
    for (ix, item) in parent.child_items().iter().enumerate() {
        path.push(ix);
        visit(VisibleNode {
            item,
            parent,
            path: IndexPath::new(path.clone()),
            depth: path.len() - 1,
        });
        if item.has_children() && is_expanded(item) {
            walk_children(item, is_expanded, visit, path);
        }
        path.pop();
    }
}

/// Everything the item renderer is given for one visible node.
#[derive(Debug)]
pub struct NodeContext<'a, T> {
    pub item: &'a TreeItem<T>,
    pub parent: &'a TreeItem<T>,
    pub path: &'a IndexPath,
    pub depth: usize,
    pub selected: bool,
    pub expanded: bool,
    /// This node is the source of the active drag.
    pub dragging: bool,
    pub can_drag: bool,
    pub hover: HoverState,
}

impl<T> NodeContext<'_, T> {
    #[inline]
    pub fn id(&self) -> &gpui::SharedString {
        &self.item.id
    }

    /// Whether to draw an expand/collapse affordance.
    #[inline]
    pub fn shows_toggle(&self) -> bool {
        self.item.is_expandable() && self.item.has_children()
    }
}
