use std::fmt;
use std::ops::Deref;

/// Address of a node, as child positions walked down from the root.
///
/// The root itself is the empty path. Paths are recomputed on every walk and are only valid
/// for the tree snapshot they were computed against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexPath(Vec<usize>);

impl IndexPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: impl Into<Vec<usize>>) -> Self {
        Self(segments.into())
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Position of the node among its siblings, `None` for the root.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<IndexPath> {
        parent_of(&self.0).map(IndexPath::from)
    }

    pub fn child(&self, ix: usize) -> IndexPath {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(ix);
        Self(segments)
    }

    /// The sibling at position `ix` inside the same parent.
    pub fn sibling(&self, ix: usize) -> Option<IndexPath> {
        let (_, parent) = self.0.split_last()?;
        Some(IndexPath::from(parent).child(ix))
    }

    pub fn is_ancestor_of(&self, other: &[usize]) -> bool {
        is_ancestor(&self.0, other)
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }
}

impl Deref for IndexPath {
    type Target = [usize];

    fn deref(&self) -> &[usize] {
        &self.0
    }
}

impl AsRef<[usize]> for IndexPath {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl From<Vec<usize>> for IndexPath {
    fn from(segments: Vec<usize>) -> Self {
        Self(segments)
    }
}

impl From<&[usize]> for IndexPath {
    fn from(segments: &[usize]) -> Self {
        Self(segments.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for IndexPath {
    fn from(segments: [usize; N]) -> Self {
        Self(segments.to_vec())
    }
}

impl PartialEq<[usize]> for IndexPath {
    fn eq(&self, other: &[usize]) -> bool {
        paths_equal(&self.0, other)
    }
}

impl<const N: usize> PartialEq<[usize; N]> for IndexPath {
    fn eq(&self, other: &[usize; N]) -> bool {
        paths_equal(&self.0, other)
    }
}

impl fmt::Display for IndexPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Same length and same segments, in order.
#[inline]
pub fn paths_equal(a: &[usize], b: &[usize]) -> bool {
    a == b
}

/// `ancestor` is a strict prefix of `descendant`. A node is never its own ancestor.
#[inline]
pub fn is_ancestor(ancestor: &[usize], descendant: &[usize]) -> bool {
    ancestor.len() < descendant.len() && descendant.starts_with(ancestor)
}

#[inline]
pub fn parent_of(path: &[usize]) -> Option<&[usize]> {
    path.split_last().map(|(_, parent)| parent)
}

/// Where `path` ends up once the node at `removed` is taken out of the tree.
///
/// Later siblings of `removed` (and everything below them) shift down by one. Returns `None`
/// when `path` lies inside the removed subtree.
pub fn shift_after_removal(path: &[usize], removed: &[usize]) -> Option<IndexPath> {
    let Some((&removed_ix, removed_parent)) = removed.split_last() else {
        return None;
    };
    if paths_equal(path, removed) || is_ancestor(removed, path) {
        return None;
    }

    let mut shifted = path.to_vec();
    let level = removed_parent.len();
    if shifted.len() > level
        && shifted.starts_with(removed_parent)
        && shifted[level] > removed_ix
    {
        shifted[level] -= 1;
    }
    Some(IndexPath(shifted))
}
