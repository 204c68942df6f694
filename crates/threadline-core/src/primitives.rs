//! # Rendering Primitives
//!
//! Fixed constants shared by the builder, the renderer and every host.
//!
//! These values are part of the output contract: hosts style and address
//! rendered nodes through them, so they only change together with the hosts.

/// Indentation added per nesting level, in display units.
///
/// A node at depth `d` is indented by `d * DEFAULT_INDENT_UNIT`.
pub const DEFAULT_INDENT_UNIT: u32 = 30;

/// Class tag attached to every rendered comment node.
pub const COMMENT_CLASS: &str = "comment";

/// Prefix of the stable node identifier (`comment-<id>`).
pub const DOM_ID_PREFIX: &str = "comment-";

/// Display name used when upstream no longer knows the author.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Label placed before the parent's author on reply attribution lines.
pub const REPLYING_TO_LABEL: &str = "Replying to";

/// Name of the host container rendered threads are appended to.
pub const THREAD_CONTAINER_ID: &str = "comments-header";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indent_unit_is_thirty() {
        assert_eq!(DEFAULT_INDENT_UNIT, 30);
    }

    #[test]
    fn dom_id_prefix_matches_class() {
        assert!(DOM_ID_PREFIX.starts_with(COMMENT_CLASS));
    }
}
