use gpui::SharedString;

use crate::geometry::DropZones;

/// Drag type tag used for same-tree drags unless configured otherwise.
pub const DEFAULT_DRAG_ITEM_TYPE: &str = "tree-item";

/// Tree-wide behavior switches.
#[derive(Clone, Debug)]
pub struct TreeConfig {
    drag_enabled: bool,
    drag_item_type: SharedString,
    accepted_externals: Vec<SharedString>,
    multi_select: bool,
    multi_expand: bool,
    zones: DropZones,
    expand_on_drop_into: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            drag_enabled: true,
            drag_item_type: DEFAULT_DRAG_ITEM_TYPE.into(),
            accepted_externals: Vec::new(),
            multi_select: false,
            multi_expand: true,
            zones: DropZones::default(),
            expand_on_drop_into: false,
        }
    }
}

impl TreeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drag_enabled(mut self, enabled: bool) -> Self {
        self.drag_enabled = enabled;
        self
    }

    /// Tag carried by drags that start inside this tree.
    pub fn drag_item_type(mut self, drag_type: impl Into<SharedString>) -> Self {
        self.drag_item_type = drag_type.into();
        self
    }

    /// Restrict external drops to these type patterns (`"text/plain"`, `"file/*"`, `"*"`).
    ///
    /// An empty list accepts any external type on nodes that allow external drops.
    pub fn accepted_externals<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SharedString>,
    {
        self.accepted_externals = patterns.into_iter().map(Into::into).collect();
        self
    }

    pub fn multi_select(mut self, multi_select: bool) -> Self {
        self.multi_select = multi_select;
        self
    }

    /// When disabled, expanding a node collapses every other node.
    pub fn multi_expand(mut self, multi_expand: bool) -> Self {
        self.multi_expand = multi_expand;
        self
    }

    /// Size of the top and bottom sibling bands as a fraction of the node height.
    ///
    /// Defaults to `0.25`.
    pub fn edge_fraction(mut self, edge_fraction: f32) -> Self {
        self.zones = DropZones::new(edge_fraction);
        self
    }

    /// Expand the receiving node after another node is dropped into its children.
    pub fn expand_on_drop_into(mut self, expand: bool) -> Self {
        self.expand_on_drop_into = expand;
        self
    }

    #[inline]
    pub fn is_drag_enabled(&self) -> bool {
        self.drag_enabled
    }

    #[inline]
    pub fn item_type(&self) -> &SharedString {
        &self.drag_item_type
    }

    #[inline]
    pub fn is_multi_select(&self) -> bool {
        self.multi_select
    }

    #[inline]
    pub fn is_multi_expand(&self) -> bool {
        self.multi_expand
    }

    #[inline]
    pub fn zones(&self) -> DropZones {
        self.zones
    }

    #[inline]
    pub fn expands_on_drop_into(&self) -> bool {
        self.expand_on_drop_into
    }

    pub fn accepts_external(&self, drag_type: &str) -> bool {
        self.accepted_externals.is_empty()
            || self
                .accepted_externals
                .iter()
                .any(|pattern| matches_type(drag_type, pattern))
    }
}

/// Exact match, `"*"`, or a `"prefix/*"` wildcard.
pub fn matches_type(drag_type: &str, pattern: &str) -> bool {
    if pattern == "*" || pattern == "*/*" {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(prefix) => {
            drag_type.starts_with(prefix) && drag_type.as_bytes().get(prefix.len()) == Some(&b'/')
        }
        None => drag_type == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_patterns() {
        assert!(matches_type("text/plain", "text/plain"));
        assert!(matches_type("text/plain", "text/*"));
        assert!(matches_type("anything", "*"));
        assert!(!matches_type("textual/plain", "text/*"));
        assert!(!matches_type("text", "text/*"));
        assert!(!matches_type("image/png", "text/plain"));
    }

    #[test]
    fn empty_accept_list_accepts_everything() {
        let config = TreeConfig::new();
        assert!(config.accepts_external("file/path"));

        let config = config.accepted_externals(["file/*"]);
        assert!(config.accepts_external("file/path"));
        assert!(!config.accepts_external("text/plain"));
    }

    #[test]
    fn defaults() {
        let config = TreeConfig::default();
        assert!(config.is_drag_enabled());
        assert_eq!(config.item_type().as_str(), DEFAULT_DRAG_ITEM_TYPE);
        assert!(!config.is_multi_select());
        assert!(config.is_multi_expand());
        assert!(!config.expands_on_drop_into());
        assert_eq!(config.zones(), DropZones::default());
    }
}
