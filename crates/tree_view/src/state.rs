use std::collections::HashSet;

use gpui::SharedString;

use crate::config::TreeConfig;
use crate::item::{TreeItem, find_by_id};
use crate::path::IndexPath;

/// Receives the registry contents, in insertion order, after every user-driven change.
pub type MembershipCallback<T> = Box<dyn FnMut(&[TreeItem<T>], &[IndexPath])>;

#[derive(Clone, Debug)]
struct Member<T> {
    item: TreeItem<T>,
    path: IndexPath,
}

/// An insertion-ordered set of nodes keyed by id, with their path at the time they were added.
#[derive(Clone, Debug)]
pub struct Registry<T> {
    multiple: bool,
    members: Vec<Member<T>>,
    ids: HashSet<SharedString>,
    controlled: Option<Vec<SharedString>>,
    pending: Vec<SharedString>,
}

impl<T: Clone> Registry<T> {
    pub fn new(multiple: bool) -> Self {
        Self {
            multiple,
            members: Vec::new(),
            ids: HashSet::new(),
            controlled: None,
            pending: Vec::new(),
        }
    }

    #[inline]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    #[inline]
    pub fn contains(&self, id: &SharedString) -> bool {
        self.ids.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &SharedString> {
        self.members.iter().map(|member| &member.item.id)
    }

    pub fn items(&self) -> impl Iterator<Item = (&TreeItem<T>, &IndexPath)> {
        self.members.iter().map(|member| (&member.item, &member.path))
    }

    /// Single mode: the node becomes the only member. Multiple mode: flip its membership.
    pub fn toggle(&mut self, item: &TreeItem<T>, path: IndexPath) {
        self.pending.clear();
        if !self.multiple {
            self.clear();
            self.insert(item, path);
        } else if !self.remove(&item.id) {
            self.insert(item, path);
        }
    }

    /// Set membership explicitly. Returns whether anything changed.
    pub fn set(&mut self, item: &TreeItem<T>, path: IndexPath, member: bool) -> bool {
        self.pending.clear();
        match (member, self.contains(&item.id)) {
            (true, true) | (false, false) => false,
            (true, false) => {
                if !self.multiple {
                    self.clear();
                }
                self.insert(item, path);
                true
            }
            (false, true) => self.remove(&item.id),
        }
    }

    pub fn clear(&mut self) -> bool {
        self.pending.clear();
        self.reset()
    }

    fn reset(&mut self) -> bool {
        let changed = !self.members.is_empty();
        self.members.clear();
        self.ids.clear();
        changed
    }

    /// Rebuild from a caller-supplied id list, resolving each id against `root`.
    ///
    /// Only runs when `controlled` differs from the list seen last time; returns whether it ran.
    /// Unknown ids are left out of the registry and kept as [`Registry::pending`].
    pub fn reconcile(&mut self, root: &TreeItem<T>, controlled: &[SharedString]) -> bool {
        if self.controlled.as_deref() == Some(controlled) {
            return false;
        }
        self.controlled = Some(controlled.to_vec());

        self.reset();
        self.pending.clear();
        self.fill(root, controlled);
        true
    }

    fn fill(&mut self, root: &TreeItem<T>, ids: &[SharedString]) {
        let controlled = self.controlled.clone().unwrap_or_default();
        for (id, found) in ids.iter().zip(find_by_id(root, ids)) {
            match found {
                Some((item, path)) => self.insert(item, path),
                None if controlled.contains(id) && !self.pending.contains(id) => {
                    self.pending.push(id.clone());
                }
                None => {}
            }
        }
    }

    /// Refresh stored nodes and paths against a new snapshot, dropping ids that are gone.
    ///
    /// Ids from the controlled list that do not resolve stay pending and are picked up by a
    /// later snapshot that contains them, until a user gesture changes the registry.
    pub fn resolve(&mut self, root: &TreeItem<T>) {
        let mut ids: Vec<SharedString> = self.ids().cloned().collect();
        ids.append(&mut self.pending);
        self.reset();
        self.fill(root, &ids);
    }

    /// Ids named by the controlled list that the current tree does not contain.
    pub fn pending(&self) -> &[SharedString] {
        &self.pending
    }

    pub fn snapshot(&self) -> (Vec<TreeItem<T>>, Vec<IndexPath>) {
        self.members
            .iter()
            .map(|member| (member.item.clone(), member.path.clone()))
            .unzip()
    }

    fn insert(&mut self, item: &TreeItem<T>, path: IndexPath) {
        if self.ids.insert(item.id.clone()) {
            self.members.push(Member {
                item: item.clone(),
                path,
            });
        }
    }

    fn remove(&mut self, id: &SharedString) -> bool {
        if !self.ids.remove(id) {
            return false;
        }
        self.members.retain(|member| member.item.id != *id);
        true
    }
}

/// Selection and expansion for one mounted tree.
///
/// User gestures (`select`, `expand`) mutate the registries and report the new contents through
/// `on_select` / `on_expand`. Controlled lists (`reconcile_*`) overwrite the registries without
/// reporting back, so a caller that echoes the callback into the controlled list cannot loop.
pub struct TreeState<T> {
    selection: Registry<T>,
    expansion: Registry<T>,
    on_select: Option<MembershipCallback<T>>,
    on_expand: Option<MembershipCallback<T>>,
}

impl<T: Clone> TreeState<T> {
    pub fn new(config: &TreeConfig) -> Self {
        Self {
            selection: Registry::new(config.is_multi_select()),
            expansion: Registry::new(config.is_multi_expand()),
            on_select: None,
            on_expand: None,
        }
    }

    pub fn on_select(mut self, f: impl FnMut(&[TreeItem<T>], &[IndexPath]) + 'static) -> Self {
        self.on_select = Some(Box::new(f));
        self
    }

    pub fn on_expand(mut self, f: impl FnMut(&[TreeItem<T>], &[IndexPath]) + 'static) -> Self {
        self.on_expand = Some(Box::new(f));
        self
    }

    pub fn set_on_select(&mut self, f: impl FnMut(&[TreeItem<T>], &[IndexPath]) + 'static) {
        self.on_select = Some(Box::new(f));
    }

    pub fn set_on_expand(&mut self, f: impl FnMut(&[TreeItem<T>], &[IndexPath]) + 'static) {
        self.on_expand = Some(Box::new(f));
    }

    #[inline]
    pub fn selection(&self) -> &Registry<T> {
        &self.selection
    }

    #[inline]
    pub fn expansion(&self) -> &Registry<T> {
        &self.expansion
    }

    #[inline]
    pub fn is_selected(&self, id: &SharedString) -> bool {
        self.selection.contains(id)
    }

    #[inline]
    pub fn is_expanded(&self, id: &SharedString) -> bool {
        self.expansion.contains(id)
    }

    pub fn selected_ids(&self) -> Vec<SharedString> {
        self.selection.ids().cloned().collect()
    }

    pub fn expanded_ids(&self) -> Vec<SharedString> {
        self.expansion.ids().cloned().collect()
    }

    /// Toggle selection of a node. Ignored for nodes that are not selectable.
    pub fn select(&mut self, item: &TreeItem<T>, path: IndexPath) {
        if !item.is_selectable() {
            return;
        }
        self.selection.toggle(item, path);
        Self::emit(&self.selection, &mut self.on_select);
    }

    /// Expand or collapse a node. Ignored for nodes that are not expandable.
    pub fn expand(&mut self, item: &TreeItem<T>, path: IndexPath, expanded: bool) {
        if !item.is_expandable() {
            return;
        }
        if self.expansion.set(item, path, expanded) {
            Self::emit(&self.expansion, &mut self.on_expand);
        }
    }

    pub fn toggle_expanded(&mut self, item: &TreeItem<T>, path: IndexPath) {
        let expanded = !self.is_expanded(&item.id);
        self.expand(item, path, expanded);
    }

    pub fn clear_selection(&mut self) {
        if self.selection.clear() {
            Self::emit(&self.selection, &mut self.on_select);
        }
    }

    pub fn collapse_all(&mut self) {
        if self.expansion.clear() {
            Self::emit(&self.expansion, &mut self.on_expand);
        }
    }

    /// Apply a controlled selection list. Returns whether the list changed since last time.
    pub fn reconcile_selected(&mut self, root: &TreeItem<T>, ids: &[SharedString]) -> bool {
        let changed = self.selection.reconcile(root, ids);
        if changed {
            tracing::debug!(count = self.selection.len(), "reconciled controlled selection");
        }
        changed
    }

    /// Apply a controlled expansion list. Returns whether the list changed since last time.
    pub fn reconcile_expanded(&mut self, root: &TreeItem<T>, ids: &[SharedString]) -> bool {
        let changed = self.expansion.reconcile(root, ids);
        if changed {
            tracing::debug!(count = self.expansion.len(), "reconciled controlled expansion");
        }
        changed
    }

    /// Re-resolve stored paths after the tree was replaced.
    pub fn resolve(&mut self, root: &TreeItem<T>) {
        self.selection.resolve(root);
        self.expansion.resolve(root);
    }

    fn emit(registry: &Registry<T>, callback: &mut Option<MembershipCallback<T>>) {
        if let Some(callback) = callback.as_mut() {
            let (items, paths) = registry.snapshot();
            callback(&items, &paths);
        }
    }
}
