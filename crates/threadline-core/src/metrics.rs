//! # Thread Metrics
//!
//! Summary numbers for a rendered forest. Integer arithmetic only.

use crate::renderer::RenderedNode;
use serde::{Deserialize, Serialize};

/// Shape of one rendered snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ThreadMetrics {
    /// Total number of rendered comments.
    pub comment_count: usize,
    /// Number of threads (roots).
    pub thread_count: usize,
    /// Comments that reply to another comment.
    pub reply_count: usize,
    /// Deepest nesting level reached (root = 0).
    pub max_depth: usize,
    /// Size of the biggest thread, root included.
    pub largest_thread: usize,
}

impl ThreadMetrics {
    /// Metrics of an empty comment section.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute metrics from a rendered forest.
    #[must_use]
    pub fn from_forest(forest: &[RenderedNode]) -> Self {
        let sizes: Vec<usize> = forest.iter().map(RenderedNode::size).collect();
        let comment_count = sizes.iter().copied().fold(0usize, usize::saturating_add);

        Self {
            comment_count,
            thread_count: forest.len(),
            reply_count: comment_count.saturating_sub(forest.len()),
            max_depth: forest.iter().map(RenderedNode::deepest).max().unwrap_or(0),
            largest_thread: sizes.into_iter().max().unwrap_or(0),
        }
    }

    /// Average replies per thread, in thousandths.
    #[must_use]
    pub fn replies_per_thread_milli(&self) -> u64 {
        if self.thread_count == 0 {
            return 0;
        }
        (self.reply_count as u64).saturating_mul(1000) / (self.thread_count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ThreadBuilder;
    use crate::renderer::ThreadRenderer;
    use crate::{CommentId, CommentRecord};

    fn forest(pairs: &[(u64, u64)]) -> Vec<RenderedNode> {
        let records: Vec<_> = pairs
            .iter()
            .map(|&(id, parent)| CommentRecord::new(CommentId(id), CommentId(parent), "A", "t", "x"))
            .collect();
        let (index, roots) = ThreadBuilder::new().build(&records).expect("build");
        ThreadRenderer::new()
            .render_all(&index, &roots)
            .expect("render")
    }

    #[test]
    fn empty_forest_is_all_zero() {
        assert_eq!(ThreadMetrics::from_forest(&[]), ThreadMetrics::empty());
        assert_eq!(ThreadMetrics::empty().replies_per_thread_milli(), 0);
    }

    #[test]
    fn counts_threads_and_replies() {
        let metrics = ThreadMetrics::from_forest(&forest(&[(1, 0), (2, 1), (3, 2), (4, 0)]));

        assert_eq!(metrics.comment_count, 4);
        assert_eq!(metrics.thread_count, 2);
        assert_eq!(metrics.reply_count, 2);
        assert_eq!(metrics.max_depth, 2);
        assert_eq!(metrics.largest_thread, 3);
        assert_eq!(metrics.replies_per_thread_milli(), 1000);
    }
}
