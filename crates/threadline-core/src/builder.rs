//! # Thread Builder
//!
//! Turns a flat, parent-linked snapshot into an insertion-ordered index plus
//! the ordered list of thread roots.
//!
//! - Indexing preserves input order; that order drives root and sibling order
//! - Linking appends every non-root id to exactly one parent's replies
//! - Unknown parents fail the whole build (or are promoted, by policy)
//! - The input slice is never mutated

use crate::{CommentId, CommentRecord, ThreadError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Thread roots in first-seen input order.
pub type Roots = Vec<CommentId>;

// =============================================================================
// COMMENT NODE
// =============================================================================

/// A record wired into the index, with the ids of its direct replies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentNode {
    record: CommentRecord,
    replies: Vec<CommentId>,
}

impl CommentNode {
    fn new(record: CommentRecord) -> Self {
        Self {
            record,
            replies: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> CommentId {
        self.record.id
    }

    #[must_use]
    pub fn parent(&self) -> CommentId {
        self.record.parent
    }

    /// The record as it was received.
    #[must_use]
    pub fn record(&self) -> &CommentRecord {
        &self.record
    }

    /// Direct replies, in input order.
    #[must_use]
    pub fn replies(&self) -> &[CommentId] {
        &self.replies
    }
}

// =============================================================================
// THREAD INDEX
// =============================================================================

/// Insertion-ordered lookup from comment id to node.
///
/// Nodes live in a `Vec` in first-insertion order; `positions` maps each id
/// to its slot. Re-inserting an id replaces the stored record in place, so
/// every id is present exactly once and keeps its original position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadIndex {
    nodes: Vec<CommentNode>,
    positions: BTreeMap<CommentId, usize>,
}

impl ThreadIndex {
    /// Create a new empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with an empty reply list.
    ///
    /// Returns `true` if the id was already present and got replaced.
    fn insert(&mut self, record: CommentRecord) -> bool {
        if let Some(&slot) = self.positions.get(&record.id) {
            self.nodes[slot] = CommentNode::new(record);
            return true;
        }
        self.positions.insert(record.id, self.nodes.len());
        self.nodes.push(CommentNode::new(record));
        false
    }

    fn get_mut(&mut self, id: CommentId) -> Option<&mut CommentNode> {
        let slot = *self.positions.get(&id)?;
        self.nodes.get_mut(slot)
    }

    /// Lookup a node by id.
    #[must_use]
    pub fn get(&self, id: CommentId) -> Option<&CommentNode> {
        self.positions
            .get(&id)
            .and_then(|&slot| self.nodes.get(slot))
    }

    #[must_use]
    pub fn contains(&self, id: CommentId) -> bool {
        self.positions.contains_key(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in input order.
    pub fn iter(&self) -> impl Iterator<Item = &CommentNode> {
        self.nodes.iter()
    }

    /// All ids in input order.
    pub fn ids(&self) -> impl Iterator<Item = CommentId> + '_ {
        self.nodes.iter().map(CommentNode::id)
    }

    /// Direct replies of a comment, or `None` if the id is unknown.
    #[must_use]
    pub fn replies_of(&self, id: CommentId) -> Option<&[CommentId]> {
        self.get(id).map(CommentNode::replies)
    }

    /// Parent reference of a comment, or `None` if the id is unknown.
    #[must_use]
    pub fn parent_of(&self, id: CommentId) -> Option<CommentId> {
        self.get(id).map(CommentNode::parent)
    }

    /// Ids that no root reaches by following replies, in input order.
    ///
    /// With every parent present, these are exactly the comments sitting on
    /// or hanging below a parent cycle.
    #[must_use]
    pub fn unreachable(&self, roots: &[CommentId]) -> Vec<CommentId> {
        let mut reached = BTreeSet::new();
        let mut stack: Vec<CommentId> = roots.to_vec();

        while let Some(id) = stack.pop() {
            if !reached.insert(id) {
                continue;
            }
            if let Some(replies) = self.replies_of(id) {
                stack.extend(replies.iter().copied());
            }
        }

        self.ids().filter(|id| !reached.contains(id)).collect()
    }

    /// The cycle a render cycle reports: `cycle_member` of the first
    /// unreachable id, in input order.
    ///
    /// Returns `None` when every comment is reachable from `roots`.
    #[must_use]
    pub fn first_cycle(&self, roots: &[CommentId]) -> Option<CommentId> {
        let first = *self.unreachable(roots).first()?;
        Some(self.cycle_member(first).unwrap_or(first))
    }

    /// Walk parent references from `start` and return the first id seen twice.
    ///
    /// Returns `None` when the walk reaches a root or leaves the index.
    #[must_use]
    pub fn cycle_member(&self, start: CommentId) -> Option<CommentId> {
        let mut seen = BTreeSet::new();
        let mut current = start;

        loop {
            if !seen.insert(current) {
                return Some(current);
            }
            let parent = self.parent_of(current)?;
            if parent.is_root() {
                return None;
            }
            current = parent;
        }
    }
}

// =============================================================================
// THREAD BUILDER
// =============================================================================

/// What to do with a reply whose parent is not in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// Fail the build with `ThreadError::MissingParent`.
    #[default]
    Reject,
    /// Start a new thread with the orphan as its root.
    Promote,
}

/// Builds a `ThreadIndex` and its roots from a flat snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadBuilder {
    orphans: OrphanPolicy,
}

impl ThreadBuilder {
    /// Create a builder that rejects orphaned replies.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_orphan_policy(mut self, orphans: OrphanPolicy) -> Self {
        self.orphans = orphans;
        self
    }

    #[must_use]
    pub fn orphan_policy(&self) -> OrphanPolicy {
        self.orphans
    }

    /// Index the records, then link every reply to its parent.
    ///
    /// # Errors
    /// Returns `ThreadError::MissingParent` for the first reply (in input
    /// order) whose parent is absent, unless orphans are promoted.
    pub fn build(&self, records: &[CommentRecord]) -> Result<(ThreadIndex, Roots), ThreadError> {
        let mut index = ThreadIndex::new();
        for record in records {
            index.insert(record.clone());
        }

        let links: Vec<(CommentId, CommentId)> =
            index.iter().map(|node| (node.id(), node.parent())).collect();

        let mut roots = Roots::new();
        for (id, parent) in links {
            if parent.is_root() {
                roots.push(id);
                continue;
            }
            match index.get_mut(parent) {
                Some(parent_node) => parent_node.replies.push(id),
                None => match self.orphans {
                    OrphanPolicy::Reject => return Err(ThreadError::MissingParent { id, parent }),
                    OrphanPolicy::Promote => roots.push(id),
                },
            }
        }

        Ok((index, roots))
    }

    /// Count ids that occur more than once in the snapshot.
    ///
    /// Duplicates are not an error (the later record wins), but hosts may
    /// want to report them.
    #[must_use]
    pub fn duplicate_ids(records: &[CommentRecord]) -> Vec<CommentId> {
        let mut seen = BTreeSet::new();
        let mut duplicates = BTreeSet::new();
        for record in records {
            if !seen.insert(record.id) {
                duplicates.insert(record.id);
            }
        }
        duplicates.into_iter().collect()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: u64, parent: u64, author: &str) -> CommentRecord {
        CommentRecord::new(
            CommentId(id),
            CommentId(parent),
            author,
            "April 5, 2018",
            format!("comment {id}"),
        )
    }

    #[test]
    fn build_links_reply_to_parent() {
        let records = vec![make_record(1, 0, "Ana"), make_record(2, 1, "Ben")];

        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(roots, vec![CommentId(1)]);
        assert_eq!(index.replies_of(CommentId(1)), Some(&[CommentId(2)][..]));
        assert_eq!(index.replies_of(CommentId(2)), Some(&[][..]));
    }

    #[test]
    fn roots_keep_input_order() {
        let records = vec![make_record(5, 0, "Ana"), make_record(3, 0, "Ben")];

        let (_, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(roots, vec![CommentId(5), CommentId(3)]);
    }

    #[test]
    fn siblings_keep_input_order() {
        let records = vec![
            make_record(10, 0, "Ana"),
            make_record(30, 10, "Ben"),
            make_record(20, 10, "Cy"),
            make_record(25, 10, "Di"),
        ];

        let (index, _) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(
            index.replies_of(CommentId(10)),
            Some(&[CommentId(30), CommentId(20), CommentId(25)][..])
        );
    }

    #[test]
    fn reply_before_parent_still_links() {
        let records = vec![make_record(2, 1, "Ben"), make_record(1, 0, "Ana")];

        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(roots, vec![CommentId(1)]);
        assert_eq!(index.replies_of(CommentId(1)), Some(&[CommentId(2)][..]));
    }

    #[test]
    fn missing_parent_fails_build() {
        let records = vec![make_record(1, 2, "Ana")];

        let result = ThreadBuilder::new().build(&records);

        assert_eq!(
            result,
            Err(ThreadError::MissingParent {
                id: CommentId(1),
                parent: CommentId(2)
            })
        );
    }

    #[test]
    fn promote_policy_turns_orphans_into_roots() {
        let records = vec![
            make_record(1, 0, "Ana"),
            make_record(2, 99, "Ben"),
            make_record(3, 2, "Cy"),
        ];

        let (index, roots) = ThreadBuilder::new()
            .with_orphan_policy(OrphanPolicy::Promote)
            .build(&records)
            .expect("build");

        assert_eq!(roots, vec![CommentId(1), CommentId(2)]);
        assert_eq!(index.replies_of(CommentId(2)), Some(&[CommentId(3)][..]));
    }

    #[test]
    fn duplicate_id_keeps_first_position_and_last_record() {
        let records = vec![
            make_record(1, 0, "Ana"),
            make_record(2, 0, "Ben"),
            make_record(1, 0, "Ana (edited)"),
        ];

        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(index.len(), 2);
        assert_eq!(roots, vec![CommentId(1), CommentId(2)]);
        let node = index.get(CommentId(1)).expect("node");
        assert_eq!(node.record().author_name, "Ana (edited)");
        assert_eq!(
            ThreadBuilder::duplicate_ids(&records),
            vec![CommentId(1)]
        );
    }

    #[test]
    fn self_reply_builds_but_is_unreachable() {
        let records = vec![make_record(1, 1, "Ana")];

        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert!(roots.is_empty());
        assert_eq!(index.unreachable(&roots), vec![CommentId(1)]);
        assert_eq!(index.cycle_member(CommentId(1)), Some(CommentId(1)));
    }

    #[test]
    fn cycle_member_finds_loop_below_tail() {
        // 4 hangs off the 2 <-> 3 loop
        let records = vec![
            make_record(1, 0, "Ana"),
            make_record(2, 3, "Ben"),
            make_record(3, 2, "Cy"),
            make_record(4, 3, "Di"),
        ];

        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(
            index.unreachable(&roots),
            vec![CommentId(2), CommentId(3), CommentId(4)]
        );
        let member = index.cycle_member(CommentId(4)).expect("cycle");
        assert!(member == CommentId(2) || member == CommentId(3));
        assert_eq!(index.cycle_member(CommentId(1)), None);
        assert_eq!(index.first_cycle(&roots), Some(CommentId(2)));
    }

    #[test]
    fn first_cycle_follows_input_order() {
        let records = vec![
            make_record(1, 0, "Ana"),
            make_record(3, 2, "Ben"),
            make_record(2, 3, "Cy"),
        ];

        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(index.first_cycle(&roots), Some(CommentId(3)));
        assert_eq!(index.first_cycle(&[CommentId(1), CommentId(2)]), None);
    }

    #[test]
    fn empty_input_builds_empty_forest() {
        let (index, roots) = ThreadBuilder::new().build(&[]).expect("build");
        assert!(index.is_empty());
        assert!(roots.is_empty());
    }

    #[test]
    fn build_does_not_touch_input() {
        let records = vec![make_record(1, 0, "Ana"), make_record(2, 1, "Ben")];
        let before = records.clone();

        let _ = ThreadBuilder::new().build(&records).expect("build");

        assert_eq!(records, before);
    }
}
