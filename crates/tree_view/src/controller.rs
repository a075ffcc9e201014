//! Per-node drag source / drop target logic.
//!
//! A [`NodeController`] is created for every visible node. It decides whether the node can be
//! dragged, classifies hovers over it, and turns a drop into a validated [`DropIntent`]. It
//! never touches the tree: the intent is reported upward and the caller splices its own data.
//!
//! Every check fails closed. Missing geometry, a dangling path or a type mismatch simply makes
//! the gesture inert.

use gpui::{Pixels, Point, SharedString};

use crate::config::{TreeConfig, matches_type};
use crate::dest::{dest_index, is_noop_move};
use crate::edit::{node_at, parent_at};
use crate::geometry::{DropType, MeasureNode, fraction_in_bounds};
use crate::item::TreeItem;
use crate::path::{IndexPath, is_ancestor, paths_equal};
use crate::state::TreeState;

/// A same-tree drag.
#[derive(Clone, Debug)]
pub struct InternalDrag<T> {
    pub drag_type: SharedString,
    pub item: TreeItem<T>,
    pub index: IndexPath,
    pub parent_item: TreeItem<T>,
}

/// A drag that started outside the tree.
///
/// The type tag is matched against the tree's accepted patterns; the bytes are opaque to the
/// engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExternalDrag {
    pub drag_type: SharedString,
    pub data: Vec<u8>,
    pub display_text: Option<SharedString>,
}

impl ExternalDrag {
    pub fn new(drag_type: impl Into<SharedString>, data: Vec<u8>) -> Self {
        Self {
            drag_type: drag_type.into(),
            data,
            display_text: None,
        }
    }

    pub fn text(drag_type: impl Into<SharedString>, text: impl Into<SharedString>) -> Self {
        let text = text.into();
        Self {
            drag_type: drag_type.into(),
            data: text.as_bytes().to_vec(),
            display_text: Some(text),
        }
    }

    pub fn with_display_text(mut self, text: impl Into<SharedString>) -> Self {
        self.display_text = Some(text.into());
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.data).ok()
    }

    pub fn matches_type(&self, pattern: &str) -> bool {
        matches_type(&self.drag_type, pattern)
    }
}

#[derive(Clone, Debug)]
pub enum DragPayload<T> {
    Internal(InternalDrag<T>),
    External(ExternalDrag),
}

impl<T> DragPayload<T> {
    pub fn drag_type(&self) -> &SharedString {
        match self {
            DragPayload::Internal(drag) => &drag.drag_type,
            DragPayload::External(drag) => &drag.drag_type,
        }
    }

    /// The externally tagged drag, if the payload came from outside any tree.
    pub fn as_external(&self) -> Option<&ExternalDrag> {
        match self {
            DragPayload::External(drag) => Some(drag),
            DragPayload::Internal(_) => None,
        }
    }

    /// Text carried by an external payload.
    pub fn as_text(&self) -> Option<&str> {
        self.as_external().and_then(ExternalDrag::as_text)
    }

    /// The same-tree drag, when the payload carries `config`'s drag type.
    fn internal_source<'a>(&'a self, config: &TreeConfig) -> Option<&'a InternalDrag<T>> {
        match self {
            DragPayload::Internal(drag) if drag.drag_type == *config.item_type() => Some(drag),
            _ => None,
        }
    }
}

/// Why a hover or drop was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DropRejected {
    #[error("target is the dragged node or inside its subtree")]
    SelfOrDescendant,
    #[error("neither the target nor its next sibling accept drops")]
    NotDroppable,
    #[error("payload type is not accepted by the target")]
    TypeMismatch,
    #[error("pointer is outside the measured node box")]
    NoGeometry,
    #[error("target does not accept children")]
    ChildrenForbidden,
    #[error("drop would leave the node where it is")]
    NoOp,
    #[error("target or destination no longer resolves")]
    Unresolved,
}

/// Read-only hover feedback for the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoverState {
    pub drop_type: Option<DropType>,
    pub can_drop: bool,
}

/// A drop that passed every check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedDrop {
    pub drop_type: DropType,
    pub dest: IndexPath,
}

/// A validated same-tree move, reported as
/// `(item, dest_parent, source_index, dest_index, source_parent)`.
#[derive(Clone, Debug)]
pub struct TreeMove<T> {
    pub item: TreeItem<T>,
    pub dest_parent: TreeItem<T>,
    pub source_index: IndexPath,
    pub dest_index: IndexPath,
    pub source_parent: TreeItem<T>,
    pub drop_type: DropType,
}

/// A validated drop of a payload that does not carry the tree's own drag type.
///
/// This is usually an [`ExternalDrag`], but a node dragged out of another tree with a different
/// item type arrives here too.
#[derive(Clone, Debug)]
pub struct ExternalDrop<T> {
    pub payload: DragPayload<T>,
    pub dest_parent: TreeItem<T>,
    pub dest_index: IndexPath,
}

#[derive(Clone, Debug)]
pub enum DropIntent<T> {
    Move(TreeMove<T>),
    External(ExternalDrop<T>),
}

/// Everything a controller needs to read about the tree during a gesture.
pub struct DropContext<'a, T> {
    pub root: &'a TreeItem<T>,
    pub config: &'a TreeConfig,
    pub state: &'a TreeState<T>,
}

impl<T> Clone for DropContext<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for DropContext<'_, T> {}

#[derive(Clone, Debug)]
pub struct NodeController {
    id: SharedString,
    path: IndexPath,
    hover: Option<HoverState>,
}

impl NodeController {
    pub fn new(id: impl Into<SharedString>, path: IndexPath) -> Self {
        Self {
            id: id.into(),
            path,
            hover: None,
        }
    }

    #[inline]
    pub fn id(&self) -> &SharedString {
        &self.id
    }

    #[inline]
    pub fn path(&self) -> &IndexPath {
        &self.path
    }

    /// Point the controller at the node's path in the latest walk.
    pub fn sync(&mut self, path: IndexPath) {
        if self.path != path {
            self.path = path;
            self.hover = None;
        }
    }

    /// Current hover feedback; the default (no drop) when not hovered.
    pub fn hover_state(&self) -> HoverState {
        self.hover.unwrap_or_default()
    }

    #[inline]
    pub fn is_hovered(&self) -> bool {
        self.hover.is_some()
    }

    pub fn can_drag<T>(&self, item: &TreeItem<T>, config: &TreeConfig, visible: bool) -> bool {
        item.id == self.id && item.is_draggable() && config.is_drag_enabled() && visible
    }

    /// Build the payload for a drag starting on this node.
    pub fn drag_payload<T: Clone>(
        &self,
        root: &TreeItem<T>,
        config: &TreeConfig,
    ) -> Option<DragPayload<T>> {
        let item = node_at(root, &self.path)?;
        let parent_item = parent_at(root, &self.path)?;
        Some(DragPayload::Internal(InternalDrag {
            drag_type: config.item_type().clone(),
            item: item.clone(),
            index: self.path.clone(),
            parent_item: parent_item.clone(),
        }))
    }

    /// Decide whether `payload` may be dropped here with the pointer at `fraction` of the node
    /// height.
    pub fn check_drop<T: Clone>(
        &self,
        cx: DropContext<'_, T>,
        payload: &DragPayload<T>,
        fraction: Option<f32>,
    ) -> Result<ResolvedDrop, DropRejected> {
        let hovered = node_at(cx.root, &self.path)
            .filter(|item| item.id == self.id)
            .ok_or(DropRejected::Unresolved)?;
        let internal = payload.internal_source(cx.config);

        if let Some(drag) = internal
            && (paths_equal(&drag.index, &self.path) || is_ancestor(&drag.index, &self.path))
        {
            return Err(DropRejected::SelfOrDescendant);
        }

        let external_allowed = internal.is_none()
            && hovered.accepts_externals()
            && cx.config.accepts_external(payload.drag_type());
        if internal.is_none() && !external_allowed {
            return Err(DropRejected::TypeMismatch);
        }

        if !external_allowed && !hovered.is_droppable() && !self.next_sibling_droppable(cx.root) {
            return Err(DropRejected::NotDroppable);
        }

        let fraction = fraction.ok_or(DropRejected::NoGeometry)?;
        let expanded_with_children = cx.state.is_expanded(&hovered.id) && hovered.has_children();
        let drop_type = cx
            .config
            .zones()
            .classify(fraction, hovered.accepts_children(), expanded_with_children)
            .ok_or(DropRejected::NoGeometry)?;
        if drop_type.is_into_children() && !hovered.accepts_children() {
            return Err(DropRejected::ChildrenForbidden);
        }

        let source = internal.map(|drag| drag.index.as_slice());
        let dest = dest_index(source, &self.path, drop_type, hovered.child_count())
            .ok_or(DropRejected::Unresolved)?;
        if source.is_some_and(|source| is_noop_move(source, &dest)) {
            return Err(DropRejected::NoOp);
        }

        Ok(ResolvedDrop { drop_type, dest })
    }

    /// Re-measure and re-classify on a pointer move over this node.
    pub fn hover<T: Clone>(
        &mut self,
        cx: DropContext<'_, T>,
        payload: &DragPayload<T>,
        measure: &impl MeasureNode,
        position: Point<Pixels>,
    ) -> HoverState {
        let fraction = self.measure_fraction(measure, position);
        let hover = match self.check_drop(cx, payload, fraction) {
            Ok(resolved) => HoverState {
                drop_type: Some(resolved.drop_type),
                can_drop: true,
            },
            Err(reason) => {
                tracing::trace!(id = %self.id, %reason, "drop rejected on hover");
                HoverState::default()
            }
        };
        self.hover = Some(hover);
        hover
    }

    /// The node stopped being the hover target.
    pub fn leave(&mut self) {
        self.hover = None;
    }

    /// Validate a drop from scratch and describe it.
    ///
    /// Geometry and the destination are recomputed here rather than taken from the last hover,
    /// since the tree or its layout may have changed in between. Hover state is cleared either
    /// way.
    pub fn commit<T: Clone>(
        &mut self,
        cx: DropContext<'_, T>,
        payload: &DragPayload<T>,
        measure: &impl MeasureNode,
        position: Point<Pixels>,
    ) -> Option<DropIntent<T>> {
        self.hover = None;
        let fraction = self.measure_fraction(measure, position);
        let resolved = match self.check_drop(cx, payload, fraction) {
            Ok(resolved) => resolved,
            Err(reason) => {
                tracing::trace!(id = %self.id, %reason, "drop rejected");
                return None;
            }
        };

        let dest_parent = parent_at(cx.root, &resolved.dest)?.clone();

        let intent = match payload.internal_source(cx.config) {
            Some(drag) => DropIntent::Move(TreeMove {
                item: drag.item.clone(),
                dest_parent,
                source_index: drag.index.clone(),
                dest_index: resolved.dest,
                source_parent: drag.parent_item.clone(),
                drop_type: resolved.drop_type,
            }),
            None => DropIntent::External(ExternalDrop {
                payload: payload.clone(),
                dest_parent,
                dest_index: resolved.dest,
            }),
        };
        Some(intent)
    }

    fn measure_fraction(&self, measure: &impl MeasureNode, position: Point<Pixels>) -> Option<f32> {
        measure
            .measure(&self.id)
            .and_then(|bounds| fraction_in_bounds(position, bounds))
    }

    fn next_sibling_droppable<T>(&self, root: &TreeItem<T>) -> bool {
        self.path
            .last()
            .and_then(|ix| self.path.sibling(ix + 1))
            .and_then(|path| node_at(root, &path))
            .is_some_and(TreeItem::is_droppable)
    }
}

#[cfg(test)]
mod tests {
    use gpui::{Bounds, point, px, size};

    use super::*;

    const ROW: f32 = 20.;

    fn node(id: &'static str) -> TreeItem<()> {
        TreeItem::new(id, ())
            .draggable(true)
            .droppable(true)
            .expandable(true)
    }

    /// `root → [A, B(children: [C, D])]`
    fn tree() -> TreeItem<()> {
        TreeItem::new("root", ())
            .droppable_into_children(true)
            .child(node("A"))
            .child(
                node("B")
                    .droppable_into_children(true)
                    .child(node("C"))
                    .child(node("D")),
            )
    }

    fn controller(root: &TreeItem<()>, path: &[usize]) -> NodeController {
        let item = node_at(root, path).unwrap();
        NodeController::new(item.id.clone(), IndexPath::from(path))
    }

    /// Every node is one row tall, stacked by id order.
    fn measure(id: &SharedString) -> Option<Bounds<Pixels>> {
        let row = ["A", "B", "C", "D"].iter().position(|known| *known == id.as_str())?;
        Some(Bounds::new(
            point(px(0.), px(ROW * row as f32)),
            size(px(200.), px(ROW)),
        ))
    }

    fn no_geometry(_: &SharedString) -> Option<Bounds<Pixels>> {
        None
    }

    /// A pointer at `fraction` of the row of `id`.
    fn at(id: &str, fraction: f32) -> Point<Pixels> {
        let row = ["A", "B", "C", "D"].iter().position(|known| *known == id).unwrap();
        point(px(10.), px(ROW * (row as f32 + fraction)))
    }

    fn drag(root: &TreeItem<()>, path: &[usize], config: &TreeConfig) -> DragPayload<()> {
        controller(root, path).drag_payload(root, config).unwrap()
    }

    #[test]
    fn drag_requires_flag_config_and_visibility() {
        let root = tree();
        let config = TreeConfig::new();
        let a = controller(&root, &[0]);
        let item = node_at(&root, &[0]).unwrap();
        assert!(a.can_drag(item, &config, true));
        assert!(!a.can_drag(item, &config, false));
        assert!(!a.can_drag(item, &TreeConfig::new().drag_enabled(false), true));
        assert!(!a.can_drag(&TreeItem::new("A", ()), &config, true));
    }

    #[test]
    fn payload_carries_source_and_parent() {
        let root = tree();
        let config = TreeConfig::new();
        let DragPayload::Internal(payload) = drag(&root, &[1, 0], &config) else {
            panic!("expected an internal drag");
        };
        assert_eq!(payload.item.id.as_str(), "C");
        assert_eq!(payload.parent_item.id.as_str(), "B");
        assert_eq!(payload.index, [1, 0]);
        assert_eq!(payload.drag_type.as_str(), config.item_type().as_str());
    }

    #[test]
    fn self_and_descendants_reject_every_zone() {
        let root = tree();
        let config = TreeConfig::new();
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let payload = drag(&root, &[1], &config);

        for path in [&[1][..], &[1, 0][..], &[1, 1][..]] {
            let target = controller(&root, path);
            for fraction in [0.0, 0.3, 0.5, 0.7, 1.0] {
                assert_eq!(
                    target.check_drop(cx, &payload, Some(fraction)),
                    Err(DropRejected::SelfOrDescendant)
                );
            }
        }
    }

    #[test]
    fn noop_moves_are_rejected() {
        let root = tree();
        let config = TreeConfig::new();
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };

        // C dropped right above D, and B dropped right below A, stay where they are.
        let payload = drag(&root, &[1, 0], &config);
        let d = controller(&root, &[1, 1]);
        assert_eq!(d.check_drop(cx, &payload, Some(0.1)), Err(DropRejected::NoOp));

        let payload = drag(&root, &[1], &config);
        let a = controller(&root, &[0]);
        assert_eq!(a.check_drop(cx, &payload, Some(0.9)), Err(DropRejected::NoOp));
    }

    #[test]
    fn missing_geometry_fails_closed() {
        let root = tree();
        let config = TreeConfig::new();
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let payload = drag(&root, &[0], &config);

        let mut d = controller(&root, &[1, 1]);
        assert_eq!(d.check_drop(cx, &payload, None), Err(DropRejected::NoGeometry));
        assert_eq!(d.hover(cx, &payload, &no_geometry, at("D", 0.9)), HoverState::default());
        assert!(d.commit(cx, &payload, &no_geometry, at("D", 0.9)).is_none());
        // Pointer over a different row than the measured one.
        assert!(!d.hover(cx, &payload, &measure, at("A", 0.5)).can_drop);
    }

    #[test]
    fn children_zone_requires_acceptance() {
        let root = tree();
        let config = TreeConfig::new();
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let payload = drag(&root, &[1, 1], &config);

        // A does not accept children, so its middle band resolves to a sibling drop.
        let a = controller(&root, &[0]);
        let resolved = a.check_drop(cx, &payload, Some(0.4)).unwrap();
        assert_eq!(resolved.drop_type, DropType::Top);
        assert_eq!(resolved.dest, [0]);
    }

    #[test]
    fn unflagged_target_needs_a_droppable_next_sibling() {
        let root = TreeItem::new("root", ())
            .child(TreeItem::new("A", ()).draggable(true))
            .child(TreeItem::new("B", ()))
            .child(TreeItem::new("C", ()).droppable(true));
        let config = TreeConfig::new();
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let payload = drag(&root, &[0], &config);

        let b = NodeController::new("B", IndexPath::from([1]));
        let c = NodeController::new("C", IndexPath::from([2]));
        assert!(b.check_drop(cx, &payload, Some(0.9)).is_ok());
        assert!(c.check_drop(cx, &payload, Some(0.9)).is_ok());

        let undroppable = TreeItem::new("root", ())
            .child(TreeItem::new("A", ()).draggable(true))
            .child(TreeItem::new("B", ()));
        let cx = DropContext { root: &undroppable, config: &config, state: &state };
        let payload = drag(&undroppable, &[0], &config);
        assert_eq!(
            b.check_drop(cx, &payload, Some(0.9)),
            Err(DropRejected::NotDroppable)
        );
    }

    #[test]
    fn foreign_types_need_external_opt_in() {
        let root = tree();
        let config = TreeConfig::new().accepted_externals(["file/*"]);
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let d = controller(&root, &[1, 1]);
        let file = DragPayload::External(ExternalDrag::text("file/path", "notes.md"));
        assert_eq!(d.check_drop(cx, &file, Some(0.9)), Err(DropRejected::TypeMismatch));

        // Same shape as an internal drag, but tagged for another tree.
        let DragPayload::Internal(mut other) = drag(&root, &[0], &config) else {
            unreachable!();
        };
        other.drag_type = "other-tree".into();
        let other = DragPayload::Internal(other);
        assert_eq!(d.check_drop(cx, &other, Some(0.9)), Err(DropRejected::TypeMismatch));

        let root = TreeItem::new("root", ())
            .child(node("A").droppable_externals(true))
            .child(node("B"));
        let cx = DropContext { root: &root, config: &config, state: &state };
        let a = controller(&root, &[0]);
        let resolved = a.check_drop(cx, &file, Some(0.9)).unwrap();
        assert_eq!(resolved.dest, [1]);

        let text = DragPayload::External(ExternalDrag::text("text/plain", "hi"));
        assert_eq!(a.check_drop(cx, &text, Some(0.9)), Err(DropRejected::TypeMismatch));
    }

    #[test]
    fn foreign_tree_drag_commits_as_external() {
        let source = tree();
        let config = TreeConfig::new();
        let DragPayload::Internal(mut other) = drag(&source, &[1, 0], &config) else {
            unreachable!();
        };
        other.drag_type = "other-tree".into();
        let other = DragPayload::Internal(other);

        let root = TreeItem::new("root", ())
            .child(node("A").droppable_externals(true))
            .child(node("B"));
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let mut a = controller(&root, &[0]);
        assert!(a.hover(cx, &other, &measure, at("A", 0.1)).can_drop);

        let Some(DropIntent::External(drop)) = a.commit(cx, &other, &measure, at("A", 0.1)) else {
            panic!("expected an external drop");
        };
        assert_eq!(drop.payload.drag_type().as_str(), "other-tree");
        assert_eq!(drop.dest_parent.id.as_str(), "root");
        assert_eq!(drop.dest_index, [0]);
    }

    #[test]
    fn hover_is_cleared_on_leave_and_path_change() {
        let root = tree();
        let config = TreeConfig::new();
        let state = TreeState::new(&config);
        let cx = DropContext { root: &root, config: &config, state: &state };
        let payload = drag(&root, &[0], &config);

        let mut d = controller(&root, &[1, 1]);
        let hover = d.hover(cx, &payload, &measure, at("D", 0.9));
        assert_eq!(
            hover,
            HoverState { drop_type: Some(DropType::Bottom), can_drop: true }
        );
        assert!(d.is_hovered());
        d.leave();
        assert_eq!(d.hover_state(), HoverState::default());

        d.hover(cx, &payload, &measure, at("D", 0.9));
        d.sync(IndexPath::from([1, 1]));
        assert!(d.is_hovered());
        d.sync(IndexPath::from([0, 1]));
        assert!(!d.is_hovered());
    }

    #[test]
    fn commit_reports_move_with_parents() {
        let root = tree();
        let config = TreeConfig::new();
        let mut state = TreeState::new(&config);
        let b = node_at(&root, &[1]).unwrap().clone();
        state.expand(&b, IndexPath::from([1]), true);
        let cx = DropContext { root: &root, config: &config, state: &state };

        let payload = drag(&root, &[0], &config);
        let mut target = controller(&root, &[1]);
        let Some(DropIntent::Move(intent)) = target.commit(cx, &payload, &measure, at("B", 0.4))
        else {
            panic!("expected a move");
        };
        assert_eq!(intent.item.id.as_str(), "A");
        assert_eq!(intent.dest_parent.id.as_str(), "B");
        assert_eq!(intent.source_index, [0]);
        assert_eq!(intent.dest_index, [1, 0]);
        assert_eq!(intent.source_parent.id.as_str(), "root");
        assert_eq!(intent.drop_type, DropType::TopOfChildren);
        assert!(!target.is_hovered());
    }
}
