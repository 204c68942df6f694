//! # Emitters
//!
//! Turn a `LoadState` into bytes for a concrete display surface.
//!
//! The core copies author names and comment text verbatim; the HTML emitter
//! is where they get escaped.

use crate::error::AppError;
use crate::refresh::LoadState;
use std::str::FromStr;
use threadline_core::primitives::THREAD_CONTAINER_ID;
use threadline_core::{RenderedNode, flatten_forest};

/// Message shown instead of threads when a refresh fails.
pub const FAILED_TO_LOAD: &str = "Comments failed to load.";

/// Message shown when a trip has no comments.
pub const NO_COMMENTS: &str = "No comments yet.";

/// A display surface for rendered threads.
pub trait Emitter {
    fn emit(&self, state: &LoadState) -> Result<String, AppError>;
}

// =============================================================================
// FORMAT SELECTION
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Html,
    Json,
}

impl FromStr for OutputFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(AppError::UnknownFormat(other.to_string())),
        }
    }
}

impl OutputFormat {
    #[must_use]
    pub fn emitter(self) -> Box<dyn Emitter> {
        match self {
            Self::Text => Box::new(TextEmitter::default()),
            Self::Html => Box::new(HtmlEmitter),
            Self::Json => Box::new(JsonEmitter { pretty: true }),
        }
    }
}

// =============================================================================
// TEXT
// =============================================================================

/// Indented outline for terminals.
#[derive(Debug, Clone, Copy)]
pub struct TextEmitter {
    /// Spaces per nesting level.
    pub step: usize,
}

impl Default for TextEmitter {
    fn default() -> Self {
        Self { step: 4 }
    }
}

impl Emitter for TextEmitter {
    fn emit(&self, state: &LoadState) -> Result<String, AppError> {
        let threads = match state {
            LoadState::Failed { reason } => return Ok(format!("{FAILED_TO_LOAD} ({reason})\n")),
            LoadState::Loaded { threads, .. } if threads.is_empty() => {
                return Ok(format!("{NO_COMMENTS}\n"));
            }
            LoadState::Loaded { threads, .. } => threads,
        };

        let mut out = String::new();
        for (i, node) in flatten_forest(threads).into_iter().enumerate() {
            if i > 0 && node.depth == 0 {
                out.push('\n');
            }
            let pad = " ".repeat(node.depth.saturating_mul(self.step));
            out.push_str(&format!("{pad}#{}\n", node.comment_id));
            for line in &node.content {
                out.push_str(&format!("{pad}{line}\n"));
            }
        }
        Ok(out)
    }
}

// =============================================================================
// HTML
// =============================================================================

/// Nested `<div>` fragment for the `comments-header` container.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlEmitter;

impl HtmlEmitter {
    /// Write one thread as nested `<div>`s, walking it depth-first.
    fn write_thread(out: &mut String, root: &RenderedNode) {
        let mut open = 0usize;
        for node in root.flatten() {
            let level = node.depth.saturating_sub(root.depth);
            while open > level {
                out.push_str("</div>");
                open -= 1;
            }
            out.push_str(&format!(
                "<div id=\"{}\" class=\"{}\" data-depth=\"{}\" style=\"padding-left: {}px\">",
                escape_html(&node.dom_id),
                escape_html(&node.class),
                node.depth,
                node.indent
            ));
            for line in &node.content {
                out.push_str(&format!("<p>{}</p>", escape_html(&line.to_string())));
            }
            open += 1;
        }
        out.push_str(&"</div>".repeat(open));
    }
}

impl Emitter for HtmlEmitter {
    fn emit(&self, state: &LoadState) -> Result<String, AppError> {
        let mut out = format!("<div id=\"{THREAD_CONTAINER_ID}\">");
        match state {
            LoadState::Failed { .. } => {
                out.push_str(&format!("<p class=\"comments-error\">{FAILED_TO_LOAD}</p>"));
            }
            LoadState::Loaded { threads, .. } if threads.is_empty() => {
                out.push_str(&format!("<p class=\"comments-empty\">{NO_COMMENTS}</p>"));
            }
            LoadState::Loaded { threads, .. } => {
                for node in threads {
                    Self::write_thread(&mut out, node);
                }
            }
        }
        out.push_str("</div>\n");
        Ok(out)
    }
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

// =============================================================================
// JSON
// =============================================================================

/// The `LoadState` itself, as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEmitter {
    pub pretty: bool,
}

impl Emitter for JsonEmitter {
    fn emit(&self, state: &LoadState) -> Result<String, AppError> {
        let json = if self.pretty {
            serde_json::to_string_pretty(state)
        } else {
            serde_json::to_string(state)
        };
        json.map(|mut s| {
            s.push('\n');
            s
        })
        .map_err(|e| AppError::Io(format!("JSON encoding failed: {}", e)))
    }
}

// =============================================================================
// TESTS
// =============================================================================
