use std::collections::{HashMap, HashSet};

use gpui::{Pixels, Point, SharedString};

use crate::config::TreeConfig;
use crate::controller::{
    DragPayload, DropContext, DropIntent, ExternalDrop, HoverState, NodeController, TreeMove,
};
use crate::edit::node_at;
use crate::geometry::MeasureNode;
use crate::item::{TreeItem, find_by_id, find_item};
use crate::path::IndexPath;
use crate::state::TreeState;
use crate::walker::{NodeContext, walk_visible};

pub type MoveCallback<T> = Box<dyn FnMut(TreeMove<T>)>;
pub type ExternalDropCallback<T> = Box<dyn FnMut(ExternalDrop<T>)>;

/// One mounted tree: the current snapshot, its selection and expansion, and a controller per
/// visible node.
///
/// The engine reads the tree but never edits it. Moves are reported through `on_drop` and
/// `on_drop_externals`; the owner applies them and hands the new snapshot back via
/// [`TreeEngine::set_tree`].
pub struct TreeEngine<T> {
    root: TreeItem<T>,
    config: TreeConfig,
    state: TreeState<T>,
    controllers: HashMap<SharedString, NodeController>,
    dragging: Option<SharedString>,
    hovered: Option<SharedString>,
    on_drop: Option<MoveCallback<T>>,
    on_drop_externals: Option<ExternalDropCallback<T>>,
}

impl<T: Clone> TreeEngine<T> {
    pub fn new(root: TreeItem<T>, config: TreeConfig) -> Self {
        let state = TreeState::new(&config);
        Self {
            root,
            config,
            state,
            controllers: HashMap::new(),
            dragging: None,
            hovered: None,
            on_drop: None,
            on_drop_externals: None,
        }
    }

    pub fn on_select(mut self, f: impl FnMut(&[TreeItem<T>], &[IndexPath]) + 'static) -> Self {
        self.state.set_on_select(f);
        self
    }

    pub fn on_expand(mut self, f: impl FnMut(&[TreeItem<T>], &[IndexPath]) + 'static) -> Self {
        self.state.set_on_expand(f);
        self
    }

    pub fn on_drop(mut self, f: impl FnMut(TreeMove<T>) + 'static) -> Self {
        self.on_drop = Some(Box::new(f));
        self
    }

    pub fn on_drop_externals(mut self, f: impl FnMut(ExternalDrop<T>) + 'static) -> Self {
        self.on_drop_externals = Some(Box::new(f));
        self
    }

    #[inline]
    pub fn root(&self) -> &TreeItem<T> {
        &self.root
    }

    #[inline]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    #[inline]
    pub fn state(&self) -> &TreeState<T> {
        &self.state
    }

    #[inline]
    pub fn state_mut(&mut self) -> &mut TreeState<T> {
        &mut self.state
    }

    #[inline]
    pub fn dragging(&self) -> Option<&SharedString> {
        self.dragging.as_ref()
    }

    #[inline]
    pub fn hovered(&self) -> Option<&SharedString> {
        self.hovered.as_ref()
    }

    /// Replace the tree snapshot.
    ///
    /// Registry paths and controller paths are re-resolved by id; nodes that disappeared are
    /// dropped without a callback.
    pub fn set_tree(&mut self, root: TreeItem<T>) {
        self.root = root;
        self.state.resolve(&self.root);

        let ids: Vec<SharedString> = self.controllers.keys().cloned().collect();
        let found = find_by_id(&self.root, &ids);
        for (id, found) in ids.iter().zip(found) {
            match found {
                Some((_, path)) => {
                    if let Some(controller) = self.controllers.get_mut(id) {
                        controller.sync(path);
                    }
                }
                None => {
                    self.controllers.remove(id);
                }
            }
        }
        if self.hovered.as_ref().is_some_and(|id| !self.controllers.contains_key(id)) {
            self.hovered = None;
        }
    }

    /// Apply a controlled selection list; a no-op when it matches the previous one.
    pub fn set_selected(&mut self, ids: &[SharedString]) -> bool {
        self.state.reconcile_selected(&self.root, ids)
    }

    /// Apply a controlled expansion list; a no-op when it matches the previous one.
    pub fn set_expanded(&mut self, ids: &[SharedString]) -> bool {
        self.state.reconcile_expanded(&self.root, ids)
    }

    /// Selection gesture on a node.
    pub fn select(&mut self, id: &SharedString) {
        if let Some((item, path)) = find_item(&self.root, id) {
            self.state.select(item, path);
        }
    }

    /// Expand/collapse gesture on a node.
    pub fn expand(&mut self, id: &SharedString, expanded: bool) {
        if let Some((item, path)) = find_item(&self.root, id) {
            self.state.expand(item, path, expanded);
        }
    }

    pub fn toggle_expanded(&mut self, id: &SharedString) {
        if let Some((item, path)) = find_item(&self.root, id) {
            self.state.toggle_expanded(item, path);
        }
    }

    /// Every ancestor below the root is expanded.
    pub fn is_visible(&self, path: &[usize]) -> bool {
        (1..path.len()).all(|depth| {
            node_at(&self.root, &path[..depth])
                .is_some_and(|ancestor| self.state.is_expanded(&ancestor.id))
        }) && node_at(&self.root, path).is_some()
    }

    pub fn can_drag(&self, id: &SharedString) -> bool {
        let Some((item, path)) = find_item(&self.root, id) else {
            return false;
        };
        let visible = self.is_visible(&path);
        NodeController::new(id.clone(), path).can_drag(item, &self.config, visible)
    }

    /// Start dragging a node. Returns the payload to carry, or `None` if it cannot be dragged.
    pub fn begin_drag(&mut self, id: &SharedString) -> Option<DragPayload<T>> {
        if !self.can_drag(id) {
            return None;
        }
        let (_, path) = find_item(&self.root, id)?;
        let payload = NodeController::new(id.clone(), path).drag_payload(&self.root, &self.config)?;
        self.dragging = Some(id.clone());
        Some(payload)
    }

    /// Pointer moved over node `id` while carrying `payload`.
    pub fn hover(
        &mut self,
        id: &SharedString,
        payload: &DragPayload<T>,
        measure: &impl MeasureNode,
        position: Point<Pixels>,
    ) -> HoverState {
        if self.hovered.as_ref() != Some(id) {
            if let Some(previous) = self.hovered.take()
                && let Some(controller) = self.controllers.get_mut(&previous)
            {
                controller.leave();
            }
            self.hovered = Some(id.clone());
        }

        let cx = DropContext {
            root: &self.root,
            config: &self.config,
            state: &self.state,
        };
        match controller_for(&mut self.controllers, &self.root, id) {
            Some(controller) => controller.hover(cx, payload, measure, position),
            None => HoverState::default(),
        }
    }

    /// The pointer left node `id`.
    pub fn leave(&mut self, id: &SharedString) {
        if let Some(controller) = self.controllers.get_mut(id) {
            controller.leave();
        }
        if self.hovered.as_ref() == Some(id) {
            self.hovered = None;
        }
    }

    /// Drop `payload` on node `id`. Returns whether a move or external drop was reported.
    ///
    /// The gesture ends either way.
    pub fn drop(
        &mut self,
        id: &SharedString,
        payload: &DragPayload<T>,
        measure: &impl MeasureNode,
        position: Point<Pixels>,
    ) -> bool {
        let cx = DropContext {
            root: &self.root,
            config: &self.config,
            state: &self.state,
        };
        let intent = controller_for(&mut self.controllers, &self.root, id)
            .and_then(|controller| controller.commit(cx, payload, measure, position));
        self.end_drag();

        match intent {
            Some(intent) => {
                self.dispatch(intent);
                true
            }
            None => false,
        }
    }

    /// Cancel or finish the active gesture, clearing all hover feedback.
    pub fn end_drag(&mut self) {
        self.dragging = None;
        self.hovered = None;
        for controller in self.controllers.values_mut() {
            controller.leave();
        }
    }

    /// Walk the visible nodes, keeping one controller per node, and render each of them.
    ///
    /// Controllers of nodes that are no longer visible are discarded along with their hover
    /// state.
    pub fn walk<R>(&mut self, mut render: impl FnMut(&NodeContext<'_, T>) -> R) -> Vec<R> {
        let Self {
            root,
            config,
            state,
            controllers,
            dragging,
            hovered,
            ..
        } = self;

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        walk_visible(
            root,
            |item| state.is_expanded(&item.id),
            |node| {
                let id = &node.item.id;
                let controller = controllers
                    .entry(id.clone())
                    .or_insert_with(|| NodeController::new(id.clone(), node.path.clone()));
                controller.sync(node.path.clone());
                seen.insert(id.clone());

                let cx = NodeContext {
                    item: node.item,
                    parent: node.parent,
                    path: &node.path,
                    depth: node.depth,
                    selected: state.is_selected(id),
                    expanded: state.is_expanded(id),
                    dragging: dragging.as_ref() == Some(id),
                    can_drag: controller.can_drag(node.item, config, true),
                    hover: controller.hover_state(),
                };
                rows.push(render(&cx));
            },
        );

        controllers.retain(|id, _| seen.contains(id));
        if hovered.as_ref().is_some_and(|id| !seen.contains(id)) {
            *hovered = None;
        }
        rows
    }

    fn dispatch(&mut self, intent: DropIntent<T>) {
        match intent {
            DropIntent::Move(tree_move) => {
                tracing::debug!(
                    item = %tree_move.item.id,
                    from = %tree_move.source_index,
                    to = %tree_move.dest_index,
                    "tree move committed"
                );
                if self.config.expands_on_drop_into() && tree_move.drop_type.is_into_children() {
                    self.expand(&tree_move.dest_parent.id, true);
                }
                if let Some(on_drop) = self.on_drop.as_mut() {
                    on_drop(tree_move);
                }
            }
            DropIntent::External(drop) => {
                tracing::debug!(
                    drag_type = %drop.payload.drag_type(),
                    to = %drop.dest_index,
                    "external drop committed"
                );
                if let Some(on_drop_externals) = self.on_drop_externals.as_mut() {
                    on_drop_externals(drop);
                }
            }
        }
    }
}

fn controller_for<'a, T>(
    controllers: &'a mut HashMap<SharedString, NodeController>,
    root: &TreeItem<T>,
    id: &SharedString,
) -> Option<&'a mut NodeController> {
    if !controllers.contains_key(id) {
        let (_, path) = find_item(root, id)?;
        controllers.insert(id.clone(), NodeController::new(id.clone(), path));
    }
    controllers.get_mut(id)
}
