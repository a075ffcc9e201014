use std::{cell::RefCell, collections::HashMap, rc::Rc};

use gpui::{
    App, AppContext as _, Bounds, Context, DragMoveEvent, ElementId, Entity, EntityId,
    EventEmitter, FocusHandle, Hsla, InteractiveElement as _, IntoElement, MouseButton,
    ParentElement as _, Pixels, Point, Render, RenderOnce, SharedString,
    StatefulInteractiveElement as _, StyleRefinement, Styled, Window, div,
    prelude::FluentBuilder as _, px,
};
use gpui_component::list::ListItem;
use gpui_component::{
    ActiveTheme as _, Icon, IconName, Sizable as _, StyledExt as _, h_flex, v_flex,
};

use crate::config::TreeConfig;
use crate::controller::{DragPayload, ExternalDrag, ExternalDrop, HoverState, TreeMove};
use crate::engine::TreeEngine;
use crate::geometry::{DropType, MeasureNode};
use crate::item::TreeItem;
use crate::path::IndexPath;
use crate::walker::NodeContext;

const CONTEXT: &str = "TreeView";

type RenderItem<T> = Rc<dyn Fn(&NodeContext<'_, T>, &mut Window, &mut App) -> ListItem>;
type EventQueue<T> = Rc<RefCell<Vec<TreeViewEvent<T>>>>;

/// Create a [`TreeView`].
pub fn tree_view<T, R>(state: &Entity<TreeViewState<T>>, render_item: R) -> TreeView<T>
where
    T: Clone + 'static,
    R: Fn(&NodeContext<'_, T>, &mut Window, &mut App) -> ListItem + 'static,
{
    TreeView::new(state, render_item)
}

/// Emitted by [`TreeViewState`] after a user gesture.
///
/// `Move` and `ExternalDrop` describe a change the owner has to apply to its own tree and hand
/// back with [`TreeViewState::set_tree`].
#[derive(Clone, Debug)]
pub enum TreeViewEvent<T> {
    Select {
        items: Vec<TreeItem<T>>,
        paths: Vec<IndexPath>,
    },
    Expand {
        items: Vec<TreeItem<T>>,
        paths: Vec<IndexPath>,
    },
    Move(TreeMove<T>),
    ExternalDrop(ExternalDrop<T>),
}

#[derive(Clone)]
struct TreeDrag {
    tree_id: EntityId,
    item_id: SharedString,
    label: SharedString,
}

/// Floating label shown under the pointer while dragging.
pub struct DragGhost {
    label: SharedString,
}

impl DragGhost {
    pub fn new(label: impl Into<SharedString>) -> Self {
        Self {
            label: label.into(),
        }
    }
}

impl Render for DragGhost {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        div()
            .px(px(10.))
            .py(px(6.))
            .rounded(px(8.))
            .bg(theme.popover)
            .border_1()
            .border_color(theme.border)
            .shadow_md()
            .text_color(theme.popover_foreground)
            .text_sm()
            .child(self.label.clone())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct TreeIndicatorStyle {
    /// Defaults to the theme foreground.
    pub color: Option<Hsla>,
    pub thickness: Pixels,
}

impl Default for TreeIndicatorStyle {
    fn default() -> Self {
        Self {
            color: None,
            thickness: px(2.),
        }
    }
}

/// Row boxes reported by the latest drag-move events, in window coordinates.
#[derive(Default)]
struct RowBounds(HashMap<SharedString, Bounds<Pixels>>);

impl MeasureNode for RowBounds {
    fn measure(&self, id: &SharedString) -> Option<Bounds<Pixels>> {
        self.0.get(id).copied()
    }
}

/// State for a tree view: the engine plus the per-gesture UI bookkeeping.
///
/// Row drags only land in the view they started from; a row dragged out of another
/// `TreeViewState` is ignored. Content from elsewhere is dropped in by dragging an
/// [`ExternalDrag`], which reaches the owner as [`TreeViewEvent::ExternalDrop`].
pub struct TreeViewState<T: 'static> {
    focus_handle: FocusHandle,
    engine: TreeEngine<T>,
    events: EventQueue<T>,
    row_bounds: RowBounds,
    drag_payload: Option<Rc<DragPayload<T>>>,
    hover: Option<(SharedString, HoverState)>,
    indent_width: Pixels,
    indicator_style: TreeIndicatorStyle,
    drag_label: Rc<dyn Fn(&TreeItem<T>) -> SharedString>,
    render_item: RenderItem<T>,
}

impl<T: Clone + 'static> EventEmitter<TreeViewEvent<T>> for TreeViewState<T> {}

impl<T: Clone + 'static> TreeViewState<T> {
    pub fn new(root: TreeItem<T>, config: TreeConfig, cx: &mut App) -> Self {
        let events: EventQueue<T> = Rc::default();
        let engine = TreeEngine::new(root, config)
            .on_select({
                let events = events.clone();
                move |items: &[TreeItem<T>], paths: &[IndexPath]| {
                    events.borrow_mut().push(TreeViewEvent::Select {
                        items: items.to_vec(),
                        paths: paths.to_vec(),
                    });
                }
            })
            .on_expand({
                let events = events.clone();
                move |items: &[TreeItem<T>], paths: &[IndexPath]| {
                    events.borrow_mut().push(TreeViewEvent::Expand {
                        items: items.to_vec(),
                        paths: paths.to_vec(),
                    });
                }
            })
            .on_drop({
                let events = events.clone();
                move |tree_move: TreeMove<T>| {
                    events.borrow_mut().push(TreeViewEvent::Move(tree_move));
                }
            })
            .on_drop_externals({
                let events = events.clone();
                move |drop: ExternalDrop<T>| {
                    events.borrow_mut().push(TreeViewEvent::ExternalDrop(drop));
                }
            });

        Self {
            focus_handle: cx.focus_handle(),
            engine,
            events,
            row_bounds: RowBounds::default(),
            drag_payload: None,
            hover: None,
            indent_width: px(16.),
            indicator_style: TreeIndicatorStyle::default(),
            drag_label: Rc::new(|item: &TreeItem<T>| item.id.clone()),
            render_item: Rc::new(|node: &NodeContext<'_, T>, _: &mut Window, _: &mut App| {
                ListItem::new(node.id().clone())
            }),
        }
    }

    /// Indentation per depth level.
    pub fn indent_width(mut self, indent_width: Pixels) -> Self {
        self.indent_width = indent_width;
        self
    }

    pub fn indicator_style(mut self, style: TreeIndicatorStyle) -> Self {
        self.indicator_style = style;
        self
    }

    pub fn indicator_color(mut self, color: Hsla) -> Self {
        self.indicator_style.color = Some(color);
        self
    }

    /// Text shown in the drag ghost. Defaults to the node id.
    pub fn drag_label(mut self, f: impl Fn(&TreeItem<T>) -> SharedString + 'static) -> Self {
        self.drag_label = Rc::new(f);
        self
    }

    #[inline]
    pub fn engine(&self) -> &TreeEngine<T> {
        &self.engine
    }

    #[inline]
    pub fn root(&self) -> &TreeItem<T> {
        self.engine.root()
    }

    pub fn selected_ids(&self) -> Vec<SharedString> {
        self.engine.state().selected_ids()
    }

    pub fn expanded_ids(&self) -> Vec<SharedString> {
        self.engine.state().expanded_ids()
    }

    pub fn set_tree(&mut self, root: TreeItem<T>, cx: &mut Context<Self>) {
        self.engine.set_tree(root);
        cx.notify();
    }

    /// Controlled selection. Does not emit [`TreeViewEvent::Select`].
    pub fn set_selected(&mut self, ids: &[SharedString], cx: &mut Context<Self>) {
        if self.engine.set_selected(ids) {
            cx.notify();
        }
    }

    /// Controlled expansion. Does not emit [`TreeViewEvent::Expand`].
    pub fn set_expanded(&mut self, ids: &[SharedString], cx: &mut Context<Self>) {
        if self.engine.set_expanded(ids) {
            cx.notify();
        }
    }

    pub fn select(&mut self, id: &SharedString, cx: &mut Context<Self>) {
        self.engine.select(id);
        self.flush_events(cx);
        cx.notify();
    }

    pub fn set_node_expanded(&mut self, id: &SharedString, expanded: bool, cx: &mut Context<Self>) {
        self.engine.expand(id, expanded);
        self.flush_events(cx);
        cx.notify();
    }

    pub fn clear_selection(&mut self, cx: &mut Context<Self>) {
        self.engine.state_mut().clear_selection();
        self.flush_events(cx);
        cx.notify();
    }

    pub fn collapse_all(&mut self, cx: &mut Context<Self>) {
        self.engine.state_mut().collapse_all();
        self.flush_events(cx);
        cx.notify();
    }

    fn flush_events(&mut self, cx: &mut Context<Self>) {
        let events = std::mem::take(&mut *self.events.borrow_mut());
        for event in events {
            cx.emit(event);
        }
    }

    fn on_toggle_click(&mut self, id: &SharedString, cx: &mut Context<Self>) {
        self.engine.toggle_expanded(id);
        self.flush_events(cx);
        cx.notify();
    }

    fn on_drag_start(&mut self, drag: &TreeDrag, cx: &mut Context<Self>) {
        self.row_bounds.0.clear();
        self.hover = None;
        self.drag_payload = self.engine.begin_drag(&drag.item_id).map(Rc::new);
        cx.notify();
    }

    fn on_row_drag_move(
        &mut self,
        id: &SharedString,
        event: &DragMoveEvent<TreeDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        if event.drag(cx).tree_id != cx.entity_id() {
            return;
        }
        let Some(payload) = self.drag_payload.clone() else {
            return;
        };
        self.track_hover(id, &payload, event.bounds, event.event.position, cx);
    }

    fn on_row_external_drag_move(
        &mut self,
        id: &SharedString,
        event: &DragMoveEvent<ExternalDrag>,
        _window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if !cx.has_active_drag() {
            return;
        }
        let payload = DragPayload::External(event.drag(cx).clone());
        self.track_hover(id, &payload, event.bounds, event.event.position, cx);
    }

    fn track_hover(
        &mut self,
        id: &SharedString,
        payload: &DragPayload<T>,
        bounds: Bounds<Pixels>,
        position: Point<Pixels>,
        cx: &mut Context<Self>,
    ) {
        self.row_bounds.0.insert(id.clone(), bounds);
        if !bounds.contains(&position) {
            if self.engine.hovered() == Some(id) {
                self.engine.leave(id);
                self.hover = None;
                cx.notify();
            }
            return;
        }

        let hover = self.engine.hover(id, payload, &self.row_bounds, position);
        let next = Some((id.clone(), hover));
        if self.hover != next {
            self.hover = next;
            cx.notify();
        }
    }

    fn on_row_drop(
        &mut self,
        id: &SharedString,
        drag: &TreeDrag,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        if drag.tree_id == cx.entity_id()
            && let Some(payload) = self.drag_payload.clone()
        {
            self.engine
                .drop(id, &payload, &self.row_bounds, window.mouse_position());
        }
        self.finish_drag(cx);
    }

    fn on_row_external_drop(
        &mut self,
        id: &SharedString,
        drag: &ExternalDrag,
        window: &mut Window,
        cx: &mut Context<Self>,
    ) {
        let payload = DragPayload::External(drag.clone());
        self.engine
            .drop(id, &payload, &self.row_bounds, window.mouse_position());
        self.finish_drag(cx);
    }

    fn finish_drag(&mut self, cx: &mut Context<Self>) {
        self.engine.end_drag();
        self.drag_payload = None;
        self.hover = None;
        self.row_bounds.0.clear();
        self.flush_events(cx);
        cx.notify();
    }
}

impl<T: Clone + 'static> Render for TreeViewState<T> {
    fn render(&mut self, window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        if !cx.has_active_drag() && (self.engine.dragging().is_some() || self.hover.is_some()) {
            self.engine.end_drag();
            self.drag_payload = None;
            self.hover = None;
            self.row_bounds.0.clear();
        }

        let render_item = Rc::clone(&self.render_item);
        let drag_label = Rc::clone(&self.drag_label);
        let state_entity = cx.entity();
        let tree_id = cx.entity_id();
        let indent_width = self.indent_width;
        let thickness = self.indicator_style.thickness.max(px(1.));
        let line_color = self.indicator_style.color.unwrap_or(cx.theme().foreground);
        let drop_target_bg = cx.theme().drop_target;
        let toggle_color = cx.theme().muted_foreground;

        let rows = self.engine.walk(|node| {
            let id = node.id().clone();
            let depth = node.depth;
            let drop_type = node.hover.drop_type.filter(|_| node.hover.can_drop);

            let line = drop_type
                .filter(|drop_type| *drop_type != DropType::BottomOfChildren)
                .map(|drop_type| {
                    let line = div().absolute().right_0().h(thickness).bg(line_color);
                    match drop_type {
                        DropType::Top => line.left(indent_width * depth).top_0(),
                        DropType::TopOfChildren => line.left(indent_width * (depth + 1)).bottom_0(),
                        _ => line.left(indent_width * depth).bottom_0(),
                    }
                });

            let toggle = div()
                .w(px(12.))
                .flex_none()
                .flex()
                .items_center()
                .justify_center()
                .text_color(toggle_color)
                .when(node.shows_toggle(), |this| {
                    let id = id.clone();
                    this.child(
                        Icon::new(if node.expanded {
                            IconName::ChevronDown
                        } else {
                            IconName::ChevronRight
                        })
                        .xsmall(),
                    )
                    .on_mouse_down(
                        MouseButton::Left,
                        cx.listener(move |this, _, _window, cx| {
                            cx.stop_propagation();
                            this.on_toggle_click(&id, cx);
                        }),
                    )
                });

            let drag_value = node.can_drag.then(|| TreeDrag {
                tree_id,
                item_id: id.clone(),
                label: (drag_label)(node.item),
            });
            let item = (render_item)(node, window, cx).selected(node.selected);

            div()
                .id(ElementId::Name(format!("tree-row-{id}").into()))
                .relative()
                .when(drop_type == Some(DropType::BottomOfChildren), |this| {
                    this.bg(drop_target_bg)
                })
                .when(node.dragging, |this| this.opacity(0.5))
                .child(
                    h_flex()
                        .child(div().w(indent_width * depth).flex_none())
                        .child(toggle)
                        .child(item.flex_1()),
                )
                .when_some(line, |this, line| this.child(line))
                .on_click({
                    let id = id.clone();
                    cx.listener(move |this, _, _window, cx| this.select(&id, cx))
                })
                .on_drag_move::<TreeDrag>({
                    let id = id.clone();
                    cx.listener(move |this, event, window, cx| {
                        this.on_row_drag_move(&id, event, window, cx);
                    })
                })
                .on_drag_move::<ExternalDrag>({
                    let id = id.clone();
                    cx.listener(move |this, event, window, cx| {
                        this.on_row_external_drag_move(&id, event, window, cx);
                    })
                })
                .on_drop::<TreeDrag>({
                    let id = id.clone();
                    cx.listener(move |this, drag, window, cx| {
                        this.on_row_drop(&id, drag, window, cx);
                    })
                })
                .on_drop::<ExternalDrag>({
                    let id = id.clone();
                    cx.listener(move |this, drag, window, cx| {
                        this.on_row_external_drop(&id, drag, window, cx);
                    })
                })
                .when_some(drag_value, |this, drag_value| {
                    let state_entity = state_entity.clone();
                    this.on_drag(drag_value, move |drag, _cursor_offset, _window, cx: &mut App| {
                        state_entity.update(cx, |state, cx| state.on_drag_start(drag, cx));
                        let label = drag.label.clone();
                        cx.new(|_| DragGhost::new(label))
                    })
                })
        });

        div()
            .id("tree-view-state")
            .size_full()
            .overflow_y_scroll()
            .child(v_flex().w_full().children(rows))
    }
}

/// A tree view element with selection, expansion and drag and drop.
#[derive(IntoElement)]
pub struct TreeView<T: Clone + 'static> {
    id: ElementId,
    state: Entity<TreeViewState<T>>,
    style: StyleRefinement,
    render_item: RenderItem<T>,
}

impl<T: Clone + 'static> TreeView<T> {
    pub fn new<R>(state: &Entity<TreeViewState<T>>, render_item: R) -> Self
    where
        R: Fn(&NodeContext<'_, T>, &mut Window, &mut App) -> ListItem + 'static,
    {
        Self {
            id: ElementId::Name(format!("tree-view-{}", state.entity_id()).into()),
            state: state.clone(),
            style: StyleRefinement::default(),
            render_item: Rc::new(render_item),
        }
    }
}

impl<T: Clone + 'static> Styled for TreeView<T> {
    fn style(&mut self) -> &mut StyleRefinement {
        &mut self.style
    }
}

impl<T: Clone + 'static> RenderOnce for TreeView<T> {
    fn render(self, _window: &mut Window, cx: &mut App) -> impl IntoElement {
        let focus_handle = self.state.read(cx).focus_handle.clone();
        self.state
            .update(cx, |state, _| state.render_item = self.render_item);

        div()
            .id(self.id)
            .key_context(CONTEXT)
            .track_focus(&focus_handle)
            .size_full()
            .child(self.state)
            .refine_style(&self.style)
    }
}
