//! # Render Cycle
//!
//! One refresh of a comment section: snapshot in, rendered forest out.
//!
//! A cycle owns everything it derives. Nothing is shared with earlier or
//! later cycles, so hosts rebuild from scratch on every fetch.

use crate::builder::{OrphanPolicy, Roots, ThreadBuilder, ThreadIndex};
use crate::metrics::ThreadMetrics;
use crate::primitives::DEFAULT_INDENT_UNIT;
use crate::renderer::{AttributionPolicy, RenderedNode, ThreadRenderer};
use crate::{CommentId, CommentRecord, ThreadError};
use serde::{Deserialize, Serialize};

// =============================================================================
// OPTIONS
// =============================================================================

/// Everything a host can tune about threading and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub indent_unit: u32,
    pub attribution: AttributionPolicy,
    pub orphans: OrphanPolicy,
    /// Optional nesting ceiling; unset renders threads of any depth.
    pub max_depth: Option<usize>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            indent_unit: DEFAULT_INDENT_UNIT,
            attribution: AttributionPolicy::default(),
            orphans: OrphanPolicy::default(),
            max_depth: None,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn builder(&self) -> ThreadBuilder {
        ThreadBuilder::new().with_orphan_policy(self.orphans)
    }

    #[must_use]
    pub fn renderer(&self) -> ThreadRenderer {
        let renderer = ThreadRenderer::new()
            .with_indent_unit(self.indent_unit)
            .with_attribution(self.attribution);
        match self.max_depth {
            Some(max_depth) => renderer.with_max_depth(max_depth),
            None => renderer,
        }
    }
}

// =============================================================================
// RENDER CYCLE
// =============================================================================

/// The result of threading and rendering one snapshot.
#[derive(Debug, Clone)]
pub struct RenderCycle {
    index: ThreadIndex,
    roots: Roots,
    forest: Vec<RenderedNode>,
}

impl RenderCycle {
    /// Build the index, reject cyclic leftovers, render every root.
    ///
    /// # Errors
    /// - `MissingParent` from the builder (with `OrphanPolicy::Reject`)
    /// - `CyclicReference` if some comments sit on a parent cycle and no
    ///   root reaches them
    /// - `DepthLimitExceeded` from the renderer
    pub fn run(records: &[CommentRecord], options: &RenderOptions) -> Result<Self, ThreadError> {
        let (index, roots) = options.builder().build(records)?;

        if let Some(id) = index.first_cycle(&roots) {
            return Err(ThreadError::CyclicReference { id });
        }

        let forest = options.renderer().render_all(&index, &roots)?;

        Ok(Self {
            index,
            roots,
            forest,
        })
    }

    #[must_use]
    pub fn index(&self) -> &ThreadIndex {
        &self.index
    }

    #[must_use]
    pub fn roots(&self) -> &[CommentId] {
        &self.roots
    }

    #[must_use]
    pub fn forest(&self) -> &[RenderedNode] {
        &self.forest
    }

    #[must_use]
    pub fn metrics(&self) -> ThreadMetrics {
        ThreadMetrics::from_forest(&self.forest)
    }

    /// Discard the index and keep only the rendered threads.
    #[must_use]
    pub fn into_forest(self) -> Vec<RenderedNode> {
        self.forest
    }
}

/// Thread and render a snapshot in one call.
pub fn thread_comments(
    records: &[CommentRecord],
    options: &RenderOptions,
) -> Result<Vec<RenderedNode>, ThreadError> {
    RenderCycle::run(records, options).map(RenderCycle::into_forest)
}

// =============================================================================
// TESTS
// =============================================================================
