//! # Thread Renderer
//!
//! Materializes threads from a `ThreadIndex` as nested `RenderedNode` trees.
//!
//! - Depth-first: a node's content comes before its replies
//! - Replies are attached as children of their parent node
//! - Output is structure only; strings are copied verbatim, never escaped
//! - A visited set guarantees termination; a depth ceiling is opt-in
//! - Rendering walks an explicit stack, so thread depth does not grow the call stack

use crate::builder::{CommentNode, ThreadIndex};
use crate::primitives::{
    COMMENT_CLASS, DEFAULT_INDENT_UNIT, DOM_ID_PREFIX, REPLYING_TO_LABEL,
};
use crate::{CommentId, CommentRecord, ThreadError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// RENDERED OUTPUT
// =============================================================================

/// One line of a comment's content block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentLine {
    /// Display name of the comment's author.
    Author(String),
    /// Display name of the author being replied to.
    ReplyingTo(String),
    /// Upstream timestamp, verbatim.
    Timestamp(String),
    /// Comment body, verbatim.
    Text(String),
}

impl ContentLine {
    /// The raw string carried by the line, without any label.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Author(s) | Self::ReplyingTo(s) | Self::Timestamp(s) | Self::Text(s) => s,
        }
    }
}

impl fmt::Display for ContentLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReplyingTo(author) => write!(f, "{} {}", REPLYING_TO_LABEL, author),
            other => f.write_str(other.value()),
        }
    }
}

/// A rendered comment with its rendered replies nested below it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedNode {
    /// Stable node identifier, `comment-<id>`.
    pub dom_id: String,
    pub comment_id: CommentId,
    /// Number of ancestors between this comment and its thread root.
    pub depth: usize,
    /// `depth * indent_unit`, in display units.
    pub indent: u32,
    pub class: String,
    pub content: Vec<ContentLine>,
    pub children: Vec<RenderedNode>,
}

impl RenderedNode {
    /// This node and all descendants, depth-first, parents before replies.
    #[must_use]
    pub fn flatten(&self) -> Vec<&RenderedNode> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(node.children.iter().rev());
        }
        out
    }

    /// Number of nodes in this subtree, including itself.
    #[must_use]
    pub fn size(&self) -> usize {
        self.flatten().len()
    }

    /// Deepest `depth` found in this subtree.
    #[must_use]
    pub fn deepest(&self) -> usize {
        self.flatten()
            .iter()
            .map(|node| node.depth)
            .fold(self.depth, usize::max)
    }
}

/// Flatten a rendered forest into one depth-first sequence.
#[must_use]
pub fn flatten_forest(forest: &[RenderedNode]) -> Vec<&RenderedNode> {
    forest.iter().flat_map(RenderedNode::flatten).collect()
}

// =============================================================================
// ATTRIBUTION
// =============================================================================

/// How the "replying to" line relates to the author line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributionPolicy {
    /// Author line first, then the "replying to" line.
    #[default]
    Augment,
    /// The "replying to" line takes the author line's place.
    Replace,
}

// =============================================================================
// RENDERER
// =============================================================================

/// Renders threads from an index.
#[derive(Debug, Clone, Copy)]
pub struct ThreadRenderer {
    indent_unit: u32,
    attribution: AttributionPolicy,
    /// `None` renders threads of any depth.
    max_depth: Option<usize>,
}

impl Default for ThreadRenderer {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT,
            attribution: AttributionPolicy::default(),
            max_depth: None,
        }
    }
}

impl ThreadRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_indent_unit(mut self, indent_unit: u32) -> Self {
        self.indent_unit = indent_unit;
        self
    }

    #[must_use]
    pub fn with_attribution(mut self, attribution: AttributionPolicy) -> Self {
        self.attribution = attribution;
        self
    }

    /// Fail with `DepthLimitExceeded` once a reply nests deeper than `max_depth`.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    /// Render the comment `id` and every reply below it.
    ///
    /// # Errors
    /// - `UnknownComment` if `id` is not in the index
    /// - `CyclicReference` if the replies lead back to a rendered comment
    /// - `DepthLimitExceeded` if a ceiling is set and nesting passes it
    pub fn render(
        &self,
        index: &ThreadIndex,
        id: CommentId,
        depth: usize,
    ) -> Result<RenderedNode, ThreadError> {
        let mut visited = BTreeSet::new();
        self.render_tree(index, id, depth, &mut visited)
    }

    /// Render every root, in root order.
    ///
    /// Each comment is rendered at most once across the whole forest.
    pub fn render_all(
        &self,
        index: &ThreadIndex,
        roots: &[CommentId],
    ) -> Result<Vec<RenderedNode>, ThreadError> {
        let mut visited = BTreeSet::new();
        let mut forest = Vec::with_capacity(roots.len());
        for &root in roots {
            forest.push(self.render_tree(index, root, 0, &mut visited)?);
        }
        Ok(forest)
    }

    /// Depth-first render of one subtree.
    ///
    /// Each stack frame is an opened node waiting for its remaining replies;
    /// a frame is attached to its parent once all replies are rendered.
    fn render_tree(
        &self,
        index: &ThreadIndex,
        id: CommentId,
        depth: usize,
        visited: &mut BTreeSet<CommentId>,
    ) -> Result<RenderedNode, ThreadError> {
        let mut stack = vec![self.open(index, id, depth, visited)?];

        while let Some(frame) = stack.last_mut() {
            if let Some(&reply) = frame.node.replies().get(frame.next_reply) {
                frame.next_reply += 1;
                let child_depth = frame.rendered.depth.saturating_add(1);
                let child = self.open(index, reply, child_depth, visited)?;
                stack.push(child);
                continue;
            }

            let Some(done) = stack.pop() else { break };
            match stack.last_mut() {
                Some(parent) => parent.rendered.children.push(done.rendered),
                None => return Ok(done.rendered),
            }
        }

        Err(ThreadError::UnknownComment(id))
    }

    /// Check one comment against the guards and render its own content.
    fn open<'a>(
        &self,
        index: &'a ThreadIndex,
        id: CommentId,
        depth: usize,
        visited: &mut BTreeSet<CommentId>,
    ) -> Result<Frame<'a>, ThreadError> {
        if !visited.insert(id) {
            return Err(ThreadError::CyclicReference { id });
        }
        if let Some(max_depth) = self.max_depth.filter(|&max| depth > max) {
            return Err(ThreadError::DepthLimitExceeded {
                id,
                depth: max_depth,
            });
        }

        let node = index.get(id).ok_or(ThreadError::UnknownComment(id))?;

        Ok(Frame {
            node,
            next_reply: 0,
            rendered: RenderedNode {
                dom_id: format!("{}{}", DOM_ID_PREFIX, id),
                comment_id: id,
                depth,
                indent: (depth as u32).saturating_mul(self.indent_unit),
                class: COMMENT_CLASS.to_string(),
                content: self.content_lines(index, node),
                children: Vec::with_capacity(node.replies().len()),
            },
        })
    }

    /// Author, optional attribution, timestamp, text.
    fn content_lines(&self, index: &ThreadIndex, node: &CommentNode) -> Vec<ContentLine> {
        let record = node.record();
        let mut lines = Vec::with_capacity(4);

        // Promoted orphans have no parent in the index and get no attribution.
        let replying_to = parent_author(index, record);

        match (self.attribution, replying_to) {
            (AttributionPolicy::Replace, Some(parent)) => {
                lines.push(ContentLine::ReplyingTo(parent));
            }
            (AttributionPolicy::Augment, Some(parent)) => {
                lines.push(ContentLine::Author(record.author_name.clone()));
                lines.push(ContentLine::ReplyingTo(parent));
            }
            (_, None) => lines.push(ContentLine::Author(record.author_name.clone())),
        }

        lines.push(ContentLine::Timestamp(record.timestamp.clone()));
        lines.push(ContentLine::Text(record.text.clone()));
        lines
    }
}

struct Frame<'a> {
    node: &'a CommentNode,
    next_reply: usize,
    rendered: RenderedNode,
}

fn parent_author(index: &ThreadIndex, record: &CommentRecord) -> Option<String> {
    if record.is_root() {
        return None;
    }
    index
        .get(record.parent)
        .map(|parent| parent.record().author_name.clone())
}

// =============================================================================
// TESTS
// =============================================================================
