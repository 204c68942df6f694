//! # threadline-core
//!
//! Deterministic comment threading - THE LOGIC.
//!
//! This crate takes a flat snapshot of comment records, each pointing at its
//! parent (or at the root sentinel `0`), and produces a forest of nested,
//! depth-aware rendered nodes.
//!
//! ## Pipeline
//!
//! ```text
//! [CommentRecord] --ThreadBuilder--> (ThreadIndex, Roots)
//!                 --ThreadRenderer--> [RenderedNode] (one tree per root)
//! ```
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no async, no network, no logging
//! - Read-only: the snapshot is never mutated, nothing outlives a cycle
//! - Deterministic: root and sibling order follow input order exactly
//! - Structure only: strings are copied verbatim, escaping is the host's job

// =============================================================================
// MODULES
// =============================================================================

pub mod builder;
pub mod cycle;
pub mod metrics;
pub mod primitives;
pub mod renderer;
pub mod types;

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use types::{CommentId, CommentRecord, ThreadError};

pub use builder::{CommentNode, OrphanPolicy, Roots, ThreadBuilder, ThreadIndex};
pub use cycle::{RenderCycle, RenderOptions, thread_comments};
pub use metrics::ThreadMetrics;
pub use renderer::{AttributionPolicy, ContentLine, RenderedNode, ThreadRenderer, flatten_forest};
