pub mod config;
pub mod controller;
pub mod dest;
pub mod edit;
pub mod engine;
pub mod geometry;
pub mod item;
pub mod path;
pub mod state;
mod view;
pub mod walker;

pub use config::{DEFAULT_DRAG_ITEM_TYPE, TreeConfig, matches_type};
pub use controller::{
    DragPayload, DropIntent, DropRejected, ExternalDrag, ExternalDrop, HoverState, InternalDrag,
    NodeController, TreeMove,
};
pub use dest::{dest_index, dest_parent, is_noop_move};
pub use edit::{apply_move, insert_at, node_at, node_at_mut, parent_at, remove_at};
pub use engine::TreeEngine;
pub use geometry::{DEFAULT_EDGE_FRACTION, DropType, DropZones, MeasureNode, fraction_in_bounds};
pub use item::{TreeItem, find_by_id, find_item};
pub use path::{IndexPath, is_ancestor, parent_of, paths_equal};
pub use state::{Registry, TreeState};
pub use view::{
    DragGhost, TreeIndicatorStyle, TreeView, TreeViewEvent, TreeViewState, tree_view,
};
pub use walker::{NodeContext, VisibleNode, walk_visible};
