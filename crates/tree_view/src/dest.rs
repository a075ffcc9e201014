use crate::geometry::DropType;
use crate::path::{IndexPath, parent_of, paths_equal};

/// Compute where a dragged node lands when dropped on `target` with `drop_type`.
///
/// The parent part of the result addresses the tree as it is now. The last segment is the
/// insertion index into that parent's children *after* the source has been removed: when the
/// source sits earlier in the same child list, everything after it shifts down by one, so the
/// raw index is decremented.
///
/// `target_child_count` is only read for [`DropType::BottomOfChildren`]. Returns `None` for a
/// sibling drop on the root, which has no parent.
pub fn dest_index(
    source: Option<&[usize]>,
    target: &[usize],
    drop_type: DropType,
    target_child_count: Option<usize>,
) -> Option<IndexPath> {
    let mut dest = match drop_type {
        DropType::Top | DropType::Bottom => {
            let (&target_ix, parent) = target.split_last()?;
            let offset = usize::from(drop_type == DropType::Bottom);
            IndexPath::from(parent).child(target_ix + offset)
        }
        DropType::TopOfChildren => IndexPath::from(target).child(0),
        DropType::BottomOfChildren => {
            IndexPath::from(target).child(target_child_count.unwrap_or(0))
        }
    }
    .into_vec();

    if let Some((&source_ix, source_parent)) = source.and_then(<[usize]>::split_last)
        && let Some((dest_ix, dest_parent)) = dest.split_last_mut()
        && paths_equal(source_parent, dest_parent)
        && source_ix < *dest_ix
    {
        *dest_ix -= 1;
    }

    Some(IndexPath::from(dest))
}

/// A move that would put the node back where it already is.
#[inline]
pub fn is_noop_move(source: &[usize], dest: &[usize]) -> bool {
    paths_equal(source, dest)
}

/// The parent path of a destination returned by [`dest_index`].
#[inline]
pub fn dest_parent(dest: &[usize]) -> Option<&[usize]> {
    parent_of(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_move;
    use crate::item::TreeItem;
    use proptest::prelude::*;

    fn flat(n: usize) -> TreeItem<()> {
        TreeItem::new("root", ()).children((0..n).map(|ix| TreeItem::new(ix.to_string(), ())))
    }

    fn order(root: &TreeItem<()>) -> Vec<String> {
        root.child_items().iter().map(|item| item.id.to_string()).collect()
    }

    /// Reference result: take the source out, then insert before/after the target.
    fn expected_order(n: usize, source: usize, target: usize, drop_type: DropType) -> Vec<String> {
        let mut ids: Vec<String> = (0..n).map(|ix| ix.to_string()).collect();
        let moved = ids.remove(source);
        let target_pos = ids
            .iter()
            .position(|id| *id == target.to_string())
            .unwrap_or(source.min(ids.len()));
        let at = match drop_type {
            DropType::Bottom => target_pos + 1,
            _ => target_pos,
        };
        ids.insert(at, moved);
        ids
    }

    #[test]
    fn bottom_of_earlier_sibling_needs_no_correction() {
        let dest = dest_index(Some(&[2][..]), &[0], DropType::Bottom, None).unwrap();
        assert_eq!(dest, [1]);
    }

    #[test]
    fn bottom_of_later_sibling_is_shifted_down() {
        let dest = dest_index(Some(&[0][..]), &[2], DropType::Bottom, None).unwrap();
        assert_eq!(dest, [2]);
    }

    #[test]
    fn top_of_self_is_a_noop() {
        let dest = dest_index(Some(&[1][..]), &[1], DropType::Top, None).unwrap();
        assert_eq!(dest, [1]);
        assert!(is_noop_move(&[1], &dest));
    }

    #[test]
    fn bottom_of_previous_sibling_is_a_noop() {
        let dest = dest_index(Some(&[1][..]), &[0], DropType::Bottom, None).unwrap();
        assert!(is_noop_move(&[1], &dest));
    }

    #[test]
    fn into_children_appends_or_prepends() {
        let first = dest_index(Some(&[0][..]), &[1], DropType::TopOfChildren, Some(3)).unwrap();
        let last = dest_index(Some(&[0][..]), &[1], DropType::BottomOfChildren, Some(3)).unwrap();
        assert_eq!(first, [1, 0]);
        assert_eq!(last, [1, 3]);
        assert_eq!(dest_parent(&last), Some(&[1][..]));
    }

    #[test]
    fn bottom_of_children_of_own_parent_is_shifted() {
        // [1, 0] dropped as last child of [1] (3 children): raw [1, 3], source removed first.
        let dest = dest_index(Some(&[1, 0][..]), &[1], DropType::BottomOfChildren, Some(3)).unwrap();
        assert_eq!(dest, [1, 2]);
    }

    #[test]
    fn leaf_target_counts_as_empty() {
        let dest = dest_index(None, &[4, 1], DropType::BottomOfChildren, None).unwrap();
        assert_eq!(dest, [4, 1, 0]);
    }

    #[test]
    fn external_drops_are_never_corrected() {
        let dest = dest_index(None, &[2], DropType::Bottom, None).unwrap();
        assert_eq!(dest, [3]);
    }

    #[test]
    fn sibling_drop_on_root_is_unresolved() {
        assert_eq!(dest_index(Some(&[0][..]), &[], DropType::Top, None), None);
        assert_eq!(
            dest_index(Some(&[0][..]), &[], DropType::BottomOfChildren, Some(2)),
            Some(IndexPath::from([1]))
        );
    }

    #[test]
    fn every_sibling_move_matches_remove_then_insert() {
        for n in 1..=6 {
            for source in 0..n {
                for target in 0..n {
                    for drop_type in [DropType::Top, DropType::Bottom] {
                        let dest = dest_index(Some(&[source][..]), &[target], drop_type, None).unwrap();
                        let mut root = flat(n);
                        let landed = apply_move(&mut root, &[source], &dest);

                        if source == target {
                            assert_eq!(order(&root), order(&flat(n)));
                            continue;
                        }
                        assert_eq!(landed, Some(dest.clone()));
                        assert_eq!(
                            order(&root),
                            expected_order(n, source, target, drop_type),
                            "n={n} source={source} target={target} {drop_type:?} dest={dest}"
                        );
                    }
                }
            }
        }
    }

    proptest! {
        #[test]
        fn moved_node_lands_at_computed_destination(
            n in 2usize..10,
            source in 0usize..10,
            target in 0usize..10,
            bottom in any::<bool>(),
        ) {
            let source = source % n;
            let target = target % n;
            prop_assume!(source != target);
            let drop_type = if bottom { DropType::Bottom } else { DropType::Top };

            let dest = dest_index(Some(&[source][..]), &[target], drop_type, None).unwrap();
            let mut root = flat(n);
            let landed = apply_move(&mut root, &[source], &dest).unwrap();

            prop_assert_eq!(root.child_items()[landed[0]].id.to_string(), source.to_string());
            prop_assert_eq!(order(&root), expected_order(n, source, target, drop_type));
        }
    }
}
