use std::cell::RefCell;
use std::rc::Rc;

use gpui::{Bounds, Pixels, Point, SharedString, point, px, size};
use gpui_tree_view::{
    DragPayload, DropType, ExternalDrag, ExternalDrop, IndexPath, InternalDrag, TreeConfig,
    TreeEngine, TreeItem, TreeMove, apply_move,
};

const ROW: f32 = 24.;
const ORDER: [&str; 4] = ["A", "B", "C", "D"];

fn node(id: &'static str) -> TreeItem<&'static str> {
    TreeItem::new(id, id)
        .selectable(true)
        .draggable(true)
        .droppable(true)
        .expandable(true)
}

/// `root → [A, B(children: [C, D])]`
fn tree() -> TreeItem<&'static str> {
    TreeItem::new("root", "root")
        .droppable_into_children(true)
        .child(node("A"))
        .child(
            node("B")
                .droppable_into_children(true)
                .child(node("C"))
                .child(node("D")),
        )
}

fn id(s: &'static str) -> SharedString {
    s.into()
}

/// Rows laid out top to bottom in `ORDER`, matching the tree with `B` expanded.
fn rows(id: &SharedString) -> Option<Bounds<Pixels>> {
    let row = ORDER.iter().position(|known| *known == id.as_str())?;
    Some(Bounds::new(
        point(px(0.), px(ROW * row as f32)),
        size(px(240.), px(ROW)),
    ))
}

fn pointer(id: &str, fraction: f32) -> Point<Pixels> {
    let row = ORDER.iter().position(|known| *known == id).unwrap_or(0);
    point(px(30.), px(ROW * (row as f32 + fraction)))
}

type Recorded = (String, String, Vec<usize>, Vec<usize>, String);

fn engine(config: TreeConfig) -> (TreeEngine<&'static str>, Rc<RefCell<Vec<Recorded>>>) {
    let moves = Rc::new(RefCell::new(Vec::new()));
    let sink = moves.clone();
    let mut engine = TreeEngine::new(tree(), config).on_drop(move |m: TreeMove<&'static str>| {
        sink.borrow_mut().push((
            m.item.id.to_string(),
            m.dest_parent.id.to_string(),
            m.source_index.into_vec(),
            m.dest_index.into_vec(),
            m.source_parent.id.to_string(),
        ));
    });
    engine.expand(&id("B"), true);
    (engine, moves)
}

#[test]
fn reorder_within_expanded_parent() {
    let (mut engine, moves) = engine(TreeConfig::new());
    let payload = engine.begin_drag(&id("C")).unwrap();

    let hover = engine.hover(&id("D"), &payload, &rows, pointer("D", 0.9));
    assert!(hover.can_drop);
    assert_eq!(hover.drop_type, Some(DropType::Bottom));

    assert!(engine.drop(&id("D"), &payload, &rows, pointer("D", 0.9)));
    // Bottom of D is index 2 before C is removed, index 1 after.
    assert_eq!(
        *moves.borrow(),
        vec![(
            "C".to_string(),
            "B".to_string(),
            vec![1, 0],
            vec![1, 1],
            "B".to_string()
        )]
    );

    let mut root = engine.root().clone();
    let moved = apply_move(&mut root, &[1, 0], &[1, 1]).unwrap();
    assert_eq!(moved, [1, 1]);
    let children: Vec<&str> = root.child_items()[1]
        .child_items()
        .iter()
        .map(|item| item.content)
        .collect();
    assert_eq!(children, ["D", "C"]);
}

#[test]
fn drop_as_first_child_of_expanded_node() {
    let (mut engine, moves) = engine(TreeConfig::new());
    let payload = engine.begin_drag(&id("A")).unwrap();

    let hover = engine.hover(&id("B"), &payload, &rows, pointer("B", 0.4));
    assert_eq!(hover.drop_type, Some(DropType::TopOfChildren));
    assert!(hover.can_drop);

    assert!(engine.drop(&id("B"), &payload, &rows, pointer("B", 0.4)));
    assert_eq!(
        *moves.borrow(),
        vec![(
            "A".to_string(),
            "B".to_string(),
            vec![0],
            vec![1, 0],
            "root".to_string()
        )]
    );

    let mut root = engine.root().clone();
    assert_eq!(apply_move(&mut root, &[0], &[1, 0]), Some(IndexPath::from([0, 0])));
    let b = &root.child_items()[0];
    let children: Vec<&str> = b.child_items().iter().map(|item| item.content).collect();
    assert_eq!(children, ["A", "C", "D"]);
}

#[test]
fn dragging_onto_own_subtree_never_drops() {
    let (mut engine, moves) = engine(TreeConfig::new());
    let payload = engine.begin_drag(&id("B")).unwrap();

    for target in ["B", "C", "D"] {
        for fraction in [0.05, 0.3, 0.5, 0.7, 0.95] {
            let hover = engine.hover(&id(target), &payload, &rows, pointer(target, fraction));
            assert!(!hover.can_drop, "{target} at {fraction}");
            assert_eq!(hover.drop_type, None);
        }
    }
    assert!(!engine.drop(&id("C"), &payload, &rows, pointer("C", 0.5)));
    assert!(moves.borrow().is_empty());
}

#[test]
fn dropping_in_place_is_inert() {
    let (mut engine, moves) = engine(TreeConfig::new());
    let payload = engine.begin_drag(&id("B")).unwrap();

    assert!(!engine.hover(&id("A"), &payload, &rows, pointer("A", 0.9)).can_drop);
    assert!(!engine.drop(&id("A"), &payload, &rows, pointer("A", 0.9)));
    assert!(moves.borrow().is_empty());
}

#[test]
fn stale_hover_is_not_trusted_at_drop() {
    let (mut engine, moves) = engine(TreeConfig::new());
    let payload = engine.begin_drag(&id("A")).unwrap();
    assert!(engine.hover(&id("D"), &payload, &rows, pointer("D", 0.9)).can_drop);

    // The row moved away from the pointer between hover and drop.
    let shifted = |id: &SharedString| {
        rows(id).map(|bounds| {
            Bounds::new(
                point(bounds.origin.x, bounds.origin.y + px(500.)),
                bounds.size,
            )
        })
    };
    assert!(!engine.drop(&id("D"), &payload, &shifted, pointer("D", 0.9)));
    assert!(moves.borrow().is_empty());
}

#[test]
fn drag_disabled_tree_is_inert() {
    let (mut engine, _) = engine(TreeConfig::new().drag_enabled(false));
    assert!(engine.begin_drag(&id("A")).is_none());
}

#[test]
fn external_payloads_follow_accepted_types() {
    let drops = Rc::new(RefCell::new(Vec::new()));
    let sink = drops.clone();
    let root = TreeItem::new("root", "root")
        .child(node("A").droppable_externals(true))
        .child(node("B"));
    let config = TreeConfig::new().accepted_externals(["file/*"]);
    let mut engine = TreeEngine::new(root, config).on_drop_externals(
        move |drop: ExternalDrop<&'static str>| {
            sink.borrow_mut().push((
                drop.payload.as_text().map(str::to_string),
                drop.dest_parent.id.to_string(),
                drop.dest_index.into_vec(),
            ));
        },
    );

    let text = DragPayload::External(ExternalDrag::text("text/plain", "hello"));
    assert!(!engine.hover(&id("A"), &text, &rows, pointer("A", 0.1)).can_drop);
    assert!(!engine.drop(&id("A"), &text, &rows, pointer("A", 0.1)));

    let file = DragPayload::External(ExternalDrag::text("file/path", "notes.md"));
    assert!(!engine.hover(&id("B"), &file, &rows, pointer("B", 0.1)).can_drop);
    assert!(engine.drop(&id("A"), &file, &rows, pointer("A", 0.1)));
    assert_eq!(
        *drops.borrow(),
        vec![(Some("notes.md".to_string()), "root".to_string(), vec![0])]
    );
}

#[test]
fn node_from_another_tree_lands_as_external_drop() {
    let drops = Rc::new(RefCell::new(Vec::new()));
    let moves = Rc::new(RefCell::new(0));
    let drop_sink = drops.clone();
    let move_sink = moves.clone();
    let root = TreeItem::new("root", "root")
        .child(node("A").droppable_externals(true))
        .child(node("B"));
    let mut engine = TreeEngine::new(root, TreeConfig::new())
        .on_drop(move |_: TreeMove<&'static str>| *move_sink.borrow_mut() += 1)
        .on_drop_externals(move |drop: ExternalDrop<&'static str>| {
            drop_sink.borrow_mut().push((
                drop.payload.drag_type().to_string(),
                drop.dest_parent.id.to_string(),
                drop.dest_index.into_vec(),
            ));
        });

    let other = DragPayload::Internal(InternalDrag {
        drag_type: "other-tree".into(),
        item: node("X"),
        index: IndexPath::from([3]),
        parent_item: TreeItem::new("other-root", "other-root"),
    });

    assert!(!engine.hover(&id("B"), &other, &rows, pointer("B", 0.1)).can_drop);
    assert!(engine.hover(&id("A"), &other, &rows, pointer("A", 0.1)).can_drop);
    assert!(engine.drop(&id("A"), &other, &rows, pointer("A", 0.1)));

    assert_eq!(
        *drops.borrow(),
        vec![("other-tree".to_string(), "root".to_string(), vec![0])]
    );
    assert_eq!(*moves.borrow(), 0);
}
