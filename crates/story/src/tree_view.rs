use gpui::*;
use gpui_component::ActiveTheme as _;
use gpui_component::list::ListItem;
use gpui_component::{Icon, IconName, Sizable as _, h_flex, v_flex};
use gpui_tree_view::{
    DragGhost, ExternalDrag, NodeContext, TreeConfig, TreeItem, TreeViewEvent, TreeViewState,
    apply_move, insert_at, tree_view,
};

const NOTE_TYPE: &str = "text/plain";
const MAX_LOG_LINES: usize = 12;

#[derive(Clone, Debug)]
pub struct Entry {
    label: SharedString,
    folder: bool,
}

pub struct TreeViewExample {
    tree: Entity<TreeViewState<Entry>>,
    log: Vec<SharedString>,
    next_note: usize,
    _subscriptions: Vec<Subscription>,
}

impl TreeViewExample {
    pub fn view(_window: &mut Window, cx: &mut App) -> Entity<Self> {
        cx.new(|cx| {
            let config = TreeConfig::new()
                .multi_select(true)
                .accepted_externals([NOTE_TYPE])
                .expand_on_drop_into(true);
            let tree = cx.new(|cx| {
                TreeViewState::new(demo_tree(), config, cx)
                    .indent_width(px(16.))
                    .indicator_color(cx.theme().foreground)
                    .drag_label(|item: &TreeItem<Entry>| item.content.label.clone())
            });
            tree.update(cx, |state, cx| {
                state.set_expanded(&["src".into(), "src/ui".into()], cx);
            });
            let subscription = cx.subscribe(&tree, Self::on_tree_event);

            Self {
                tree,
                log: Vec::new(),
                next_note: 1,
                _subscriptions: vec![subscription],
            }
        })
    }

    fn on_tree_event(
        &mut self,
        tree: Entity<TreeViewState<Entry>>,
        event: &TreeViewEvent<Entry>,
        cx: &mut Context<Self>,
    ) {
        match event {
            TreeViewEvent::Select { items, .. } => {
                self.push_log(format!("select: {}", join_labels(items)));
            }
            TreeViewEvent::Expand { items, .. } => {
                self.push_log(format!("expand: {}", join_labels(items)));
            }
            TreeViewEvent::Move(tree_move) => {
                let mut root = tree.read(cx).root().clone();
                let Some(landed) =
                    apply_move(&mut root, &tree_move.source_index, &tree_move.dest_index)
                else {
                    tracing::warn!(item = %tree_move.item.id, "move no longer applies");
                    return;
                };
                self.push_log(format!(
                    "move: {} {} -> {} (now {})",
                    tree_move.item.content.label,
                    tree_move.source_index,
                    tree_move.dest_index,
                    landed
                ));
                tree.update(cx, |state, cx| state.set_tree(root, cx));
            }
            TreeViewEvent::ExternalDrop(drop) => {
                let label = drop.payload.as_text().unwrap_or("note").to_string();
                let id = format!("note-{}", self.next_note);
                self.next_note += 1;

                let mut root = tree.read(cx).root().clone();
                let note = file(id, format!("{label}.md"));
                match insert_at(&mut root, &drop.dest_index, note) {
                    Ok(landed) => {
                        self.push_log(format!("external: {label} -> {landed}"));
                        tree.update(cx, |state, cx| state.set_tree(root, cx));
                    }
                    Err(_) => {
                        tracing::warn!(dest = %drop.dest_index, "external drop no longer applies");
                    }
                }
            }
        }
        cx.notify();
    }

    fn push_log(&mut self, line: String) {
        tracing::info!("{line}");
        self.log.push(line.into());
        if self.log.len() > MAX_LOG_LINES {
            self.log.remove(0);
        }
    }
}

impl Render for TreeViewExample {
    fn render(&mut self, _window: &mut Window, cx: &mut Context<Self>) -> impl IntoElement {
        let theme = cx.theme();
        let state = self.tree.read(cx);
        let tree_dump = format_tree(state.root());
        let selected = state
            .selected_ids()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        v_flex()
            .size_full()
            .p(px(16.))
            .gap_y_3()
            .child(
                v_flex()
                    .gap_y_1()
                    .child(div().text_xl().font_weight(FontWeight::BOLD).child("Tree View"))
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child("Tip: drag a node onto the top or bottom quarter of a row to place it beside that row, or onto the middle of a folder to move it inside. Drag the note chip onto a folder to add a file."),
                    )
                    .child(
                        div()
                            .text_sm()
                            .text_color(theme.muted_foreground)
                            .child(format!("Selected: {selected}")),
                    ),
            )
            .child(
                h_flex().child(
                    div()
                        .id("external-note")
                        .px(px(10.))
                        .py(px(4.))
                        .rounded(px(8.))
                        .border_1()
                        .border_color(theme.border)
                        .text_sm()
                        .cursor(CursorStyle::OpenHand)
                        .child("Drag me: new note")
                        .on_drag(
                            ExternalDrag::text(NOTE_TYPE, "new-note"),
                            |drag: &ExternalDrag, _, _, cx: &mut App| {
                                let label = drag.display_text.clone().unwrap_or_default();
                                cx.new(|_| DragGhost::new(label))
                            },
                        ),
                ),
            )
            .child(
                h_flex()
                    .flex_1()
                    .min_h(px(0.))
                    .gap_x_3()
                    .child(
                        v_flex()
                            .w(px(420.))
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Tree"))
                            .child(
                                div()
                                    .flex_1()
                                    .min_h(px(0.))
                                    .rounded(px(12.))
                                    .border_1()
                                    .border_color(theme.border)
                                    .bg(theme.background)
                                    .child(tree_view(&self.tree, |node, _window, cx| {
                                        render_tree_row(node, cx)
                                    })),
                            ),
                    )
                    .child(
                        v_flex()
                            .flex_1()
                            .min_w(px(0.))
                            .h_full()
                            .gap_y_2()
                            .child(
                                div()
                                    .text_sm()
                                    .font_weight(FontWeight::MEDIUM)
                                    .child("Debug (tree structure)"),
                            )
                            .child(render_lines(tree_dump.lines().map(str::to_string).collect()))
                            .child(div().text_sm().font_weight(FontWeight::MEDIUM).child("Events"))
                            .child(render_lines(self.log.iter().map(ToString::to_string).collect())),
                    ),
            )
    }
}

fn render_tree_row(node: &NodeContext<'_, Entry>, cx: &App) -> ListItem {
    let theme = cx.theme();
    let icon = match (node.item.content.folder, node.expanded) {
        (true, true) => IconName::FolderOpen,
        (true, false) => IconName::Folder,
        (false, _) => IconName::File,
    };
    let icon_color = if node.selected {
        theme.foreground
    } else {
        theme.muted_foreground
    };

    ListItem::new(ElementId::Name(node.id().clone())).child(
        h_flex()
            .gap_x_2()
            .items_center()
            .child(Icon::new(icon).small().text_color(icon_color))
            .child(node.item.content.label.clone()),
    )
}

fn render_lines(lines: Vec<String>) -> impl IntoElement {
    v_flex()
        .gap_y_0p5()
        .children(lines.into_iter().map(|line| div().text_sm().child(line)))
}

fn join_labels(items: &[TreeItem<Entry>]) -> String {
    items
        .iter()
        .map(|item| item.content.label.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn format_tree(root: &TreeItem<Entry>) -> String {
    fn walk(items: &[TreeItem<Entry>], depth: usize, out: &mut String) {
        for item in items {
            out.push_str(&"  ".repeat(depth));
            out.push_str(item.id.as_str());
            out.push('\n');
            walk(item.child_items(), depth + 1, out);
        }
    }

    let mut out = String::new();
    walk(root.child_items(), 0, &mut out);
    out
}

fn folder(id: &'static str, label: &'static str) -> TreeItem<Entry> {
    TreeItem::new(
        id,
        Entry {
            label: label.into(),
            folder: true,
        },
    )
    .branch()
    .selectable(true)
    .draggable(true)
    .droppable(true)
    .expandable(true)
    .droppable_into_children(true)
    .droppable_externals(true)
}

fn file(id: impl Into<SharedString>, label: impl Into<SharedString>) -> TreeItem<Entry> {
    TreeItem::new(
        id,
        Entry {
            label: label.into(),
            folder: false,
        },
    )
    .selectable(true)
    .draggable(true)
    .droppable(true)
}

fn demo_tree() -> TreeItem<Entry> {
    TreeItem::new(
        "root",
        Entry {
            label: "root".into(),
            folder: true,
        },
    )
    .droppable_into_children(true)
    .child(
        folder("src", "src")
            .child(
                folder("src/ui", "ui")
                    .child(file("src/ui/button.rs", "button.rs"))
                    .child(file("src/ui/icon.rs", "icon.rs"))
                    .child(file("src/ui/tree_view.rs", "tree_view.rs")),
            )
            .child(file("src/main.rs", "main.rs"))
            .child(file("src/lib.rs", "lib.rs")),
    )
    .child(folder("docs", "docs"))
    .child(file("Cargo.toml", "Cargo.toml"))
    .child(file("Cargo.lock", "Cargo.lock").draggable(false))
    .child(file("README.md", "README.md"))
}
