//! # Property-Based Tests
//!
//! Threading invariants checked with proptest over random acyclic snapshots.
//!
//! Snapshots are generated parent-first (every parent id is smaller than its
//! child's) and then shuffled, so replies frequently precede their parents.

use proptest::collection::vec;
use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::{BTreeMap, BTreeSet};
use threadline_core::{
    CommentId, CommentRecord, RenderOptions, ThreadBuilder, ThreadRenderer, flatten_forest,
    thread_comments,
};

// =============================================================================
// STRATEGIES
// =============================================================================

fn snapshot() -> impl Strategy<Value = Vec<CommentRecord>> {
    vec(any::<Index>(), 0..60)
        .prop_map(|picks| {
            picks
                .iter()
                .enumerate()
                .map(|(i, pick)| {
                    let id = i as u64 + 1;
                    // 0 = root, otherwise one of the earlier ids
                    let parent = pick.index(i + 1) as u64;
                    CommentRecord::new(
                        CommentId(id),
                        CommentId(parent),
                        format!("user{id}"),
                        format!("t{id}"),
                        format!("text {id}"),
                    )
                })
                .collect::<Vec<_>>()
        })
        .prop_shuffle()
}

fn depth_of(parents: &BTreeMap<CommentId, CommentId>, mut id: CommentId) -> usize {
    let mut depth = 0;
    while let Some(&parent) = parents.get(&id) {
        if parent.is_root() {
            break;
        }
        depth += 1;
        id = parent;
    }
    depth
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Roots plus all reply lists contain every id exactly once.
    #[test]
    fn replies_and_roots_partition_ids(records in snapshot()) {
        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        let mut seen: Vec<CommentId> = roots.clone();
        for node in index.iter() {
            seen.extend(node.replies().iter().copied());
        }
        seen.sort();

        let mut expected: Vec<CommentId> = records.iter().map(|r| r.id).collect();
        expected.sort();

        prop_assert_eq!(index.len(), records.len());
        prop_assert_eq!(seen, expected);
    }

    /// Rendering visits every comment exactly once.
    #[test]
    fn render_visits_each_id_once(records in snapshot()) {
        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");
        let forest = ThreadRenderer::new().render_all(&index, &roots).expect("render");

        let visited: Vec<CommentId> = flatten_forest(&forest).iter().map(|n| n.comment_id).collect();
        let unique: BTreeSet<_> = visited.iter().copied().collect();

        prop_assert_eq!(visited.len(), records.len());
        prop_assert_eq!(unique.len(), records.len());
    }

    /// Roots and siblings follow first-occurrence input order.
    #[test]
    fn order_follows_input(records in snapshot()) {
        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        let expected_roots: Vec<CommentId> =
            records.iter().filter(|r| r.is_root()).map(|r| r.id).collect();
        prop_assert_eq!(&roots, &expected_roots);

        for node in index.iter() {
            let expected: Vec<CommentId> = records
                .iter()
                .filter(|r| r.parent == node.id())
                .map(|r| r.id)
                .collect();
            prop_assert_eq!(node.replies(), expected.as_slice());
        }
    }

    /// Depth equals the number of ancestors; indent follows depth.
    #[test]
    fn depth_counts_ancestors(records in snapshot()) {
        let parents: BTreeMap<CommentId, CommentId> =
            records.iter().map(|r| (r.id, r.parent)).collect();

        let forest = thread_comments(&records, &RenderOptions::default()).expect("thread");

        for node in flatten_forest(&forest) {
            prop_assert_eq!(node.depth, depth_of(&parents, node.comment_id));
            prop_assert_eq!(node.indent, node.depth as u32 * 30);
        }
    }

    /// Same snapshot, same output.
    #[test]
    fn threading_is_idempotent(records in snapshot()) {
        let options = RenderOptions::default();
        let first = thread_comments(&records, &options).expect("first");
        let second = thread_comments(&records, &options).expect("second");
        prop_assert_eq!(first, second);
    }

    /// Dropping a parent from a snapshot with replies always fails the build.
    #[test]
    fn removing_a_parent_is_detected(records in snapshot(), pick in any::<Index>()) {
        let parents: BTreeSet<CommentId> = records
            .iter()
            .filter(|r| !r.is_root())
            .map(|r| r.parent)
            .collect();
        prop_assume!(!parents.is_empty());

        let victim = *parents.iter().nth(pick.index(parents.len())).expect("victim");
        let pruned: Vec<CommentRecord> =
            records.iter().filter(|r| r.id != victim).cloned().collect();

        prop_assert!(ThreadBuilder::new().build(&pruned).is_err());
    }
}
