//! # Core Type Definitions
//!
//! This module contains the input and error types shared by every stage of a
//! render cycle:
//! - Comment identifiers (`CommentId`)
//! - The immutable input record (`CommentRecord`)
//! - Error types (`ThreadError`)
//!
//! ## Input Tolerance
//!
//! Records arrive as JSON objects from whatever the host fetched. The only
//! leniency applied at this layer mirrors what upstream actually sends:
//! - a `null` or missing `parent` is the root sentinel
//! - a `null` or missing `author_name` means the author account was removed

use crate::primitives::DELETED_AUTHOR;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Unique identifier of a comment within one snapshot.
///
/// `CommentId(0)` is reserved: as a parent reference it means "no parent".
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct CommentId(pub u64);

impl CommentId {
    /// Parent sentinel marking a root comment.
    pub const ROOT: Self = Self(0);

    /// Whether this id is the root sentinel.
    #[must_use]
    pub const fn is_root(self) -> bool {
        self.0 == Self::ROOT.0
    }

    /// Get the raw id value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for CommentId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

// =============================================================================
// COMMENT RECORD
// =============================================================================

/// A single comment exactly as delivered by the data source.
///
/// `timestamp` and `text` are opaque display strings. They are never parsed,
/// trimmed or escaped here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: CommentId,
    #[serde(default, deserialize_with = "parent_or_root")]
    pub parent: CommentId,
    #[serde(default = "deleted_author", deserialize_with = "author_or_deleted")]
    pub author_name: String,
    pub timestamp: String,
    pub text: String,
}

impl CommentRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(
        id: CommentId,
        parent: CommentId,
        author_name: impl Into<String>,
        timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parent,
            author_name: author_name.into(),
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }

    /// Whether this record starts a thread.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_root()
    }
}

fn parent_or_root<'de, D: Deserializer<'de>>(deserializer: D) -> Result<CommentId, D::Error> {
    Ok(Option::<CommentId>::deserialize(deserializer)?.unwrap_or(CommentId::ROOT))
}

fn author_or_deleted<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(deleted_author))
}

fn deleted_author() -> String {
    DELETED_AUTHOR.to_string()
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised while threading or rendering a snapshot.
///
/// A build error aborts the whole render cycle; no partial forest is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThreadError {
    /// A record references a parent that is not part of the snapshot.
    #[error("Comment {id} replies to missing parent {parent}")]
    MissingParent { id: CommentId, parent: CommentId },

    /// Following replies from this comment leads back to it.
    #[error("Cyclic reply chain through comment {id}")]
    CyclicReference { id: CommentId },

    /// A thread nests deeper than the render ceiling.
    #[error("Comment {id} exceeds maximum thread depth {depth}")]
    DepthLimitExceeded { id: CommentId, depth: usize },

    /// Rendering was requested for an id that is not in the index.
    #[error("Comment not found: {0}")]
    UnknownComment(CommentId),
}

// =============================================================================
// TESTS
// =============================================================================
