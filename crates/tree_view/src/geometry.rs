use gpui::{Bounds, Pixels, Point, SharedString};

/// Outer band size used when none is configured.
pub const DEFAULT_EDGE_FRACTION: f32 = 0.25;

const MIN_EDGE_FRACTION: f32 = 0.05;
const MAX_EDGE_FRACTION: f32 = 0.5;

/// Where a drag intends to insert, relative to the hovered node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropType {
    /// Sibling before the hovered node.
    Top,
    /// Sibling after the hovered node.
    Bottom,
    /// First child of the hovered node.
    TopOfChildren,
    /// Last child of the hovered node.
    BottomOfChildren,
}

impl DropType {
    #[inline]
    pub fn is_into_children(self) -> bool {
        matches!(self, DropType::TopOfChildren | DropType::BottomOfChildren)
    }
}

/// Maps a vertical pointer fraction inside a node box to a [`DropType`].
///
/// The outer bands always win. The middle band only yields a `*OfChildren` result for a node
/// that accepts children; otherwise it falls back to the nearer edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DropZones {
    edge_fraction: f32,
}

impl Default for DropZones {
    fn default() -> Self {
        Self {
            edge_fraction: DEFAULT_EDGE_FRACTION,
        }
    }
}

impl DropZones {
    pub fn new(edge_fraction: f32) -> Self {
        if !edge_fraction.is_finite() {
            return Self::default();
        }
        Self {
            edge_fraction: edge_fraction.clamp(MIN_EDGE_FRACTION, MAX_EDGE_FRACTION),
        }
    }

    #[inline]
    pub fn edge_fraction(&self) -> f32 {
        self.edge_fraction
    }

    /// `fraction` is `0.0` at the top edge and `1.0` at the bottom edge. `expanded_with_children`
    /// means the node is expanded and has at least one visible child.
    pub fn classify(
        &self,
        fraction: f32,
        accepts_children: bool,
        expanded_with_children: bool,
    ) -> Option<DropType> {
        if !(0.0..=1.0).contains(&fraction) {
            return None;
        }

        if fraction <= self.edge_fraction {
            return Some(DropType::Top);
        }
        if fraction >= 1.0 - self.edge_fraction {
            return Some(DropType::Bottom);
        }

        let upper_half = fraction < 0.5;
        Some(match (accepts_children, expanded_with_children) {
            (false, _) if upper_half => DropType::Top,
            (false, _) => DropType::Bottom,
            (true, true) if upper_half => DropType::TopOfChildren,
            (true, true) => DropType::BottomOfChildren,
            // Collapsed (or childless) targets always append.
            (true, false) => DropType::BottomOfChildren,
        })
    }
}

/// Vertical position of `position` inside `bounds`, normalized to `0.0..=1.0`.
///
/// `None` when the point is outside the box or the box has no height.
pub fn fraction_in_bounds(position: Point<Pixels>, bounds: Bounds<Pixels>) -> Option<f32> {
    let height: f32 = bounds.size.height.into();
    if !height.is_finite() || height <= 0.0 {
        return None;
    }
    if !bounds.contains(&position) {
        return None;
    }

    let offset: f32 = (position.y - bounds.origin.y).into();
    Some((offset / height).clamp(0.0, 1.0))
}

/// Reads the current on-screen box of a node.
///
/// This is the only place the engine touches the host surface; implementations must return
/// the box from the latest layout, not one remembered from an earlier hover.
pub trait MeasureNode {
    fn measure(&self, id: &SharedString) -> Option<Bounds<Pixels>>;
}

impl<F> MeasureNode for F
where
    F: Fn(&SharedString) -> Option<Bounds<Pixels>>,
{
    fn measure(&self, id: &SharedString) -> Option<Bounds<Pixels>> {
        self(id)
    }
}
