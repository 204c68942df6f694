//! # Refresh
//!
//! One host-side refresh: fetch a snapshot, run a render cycle, and turn the
//! outcome into something a display surface can always show.

use crate::error::AppError;
use crate::source::CommentSource;
use serde::{Deserialize, Serialize};
use threadline_core::{RenderCycle, RenderOptions, RenderedNode, ThreadMetrics};

/// What a display surface shows after a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadState {
    /// Threads rendered successfully (possibly none).
    Loaded {
        threads: Vec<RenderedNode>,
        metrics: ThreadMetrics,
    },
    /// The refresh failed; nothing partial is shown.
    Failed { reason: String },
}

impl LoadState {
    #[must_use]
    pub fn from_cycle(cycle: &RenderCycle) -> Self {
        Self::Loaded {
            threads: cycle.forest().to_vec(),
            metrics: cycle.metrics(),
        }
    }

    #[must_use]
    pub fn failed(err: &AppError) -> Self {
        Self::Failed {
            reason: err.to_string(),
        }
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }
}

/// Fetch and thread the comments of one trip.
///
/// Each call builds its own index from its own snapshot.
pub async fn refresh(
    source: &CommentSource,
    trip_id: u64,
    options: &RenderOptions,
) -> Result<RenderCycle, AppError> {
    tracing::info!(trip_id, source = %source.describe(trip_id), "Refreshing comments");

    let records = source.fetch(trip_id).await.inspect_err(|e| {
        tracing::warn!(trip_id, error = %e, "Comment fetch failed");
    })?;

    let cycle = RenderCycle::run(&records, options).inspect_err(|e| {
        tracing::warn!(trip_id, error = %e, "Comment threading failed");
    })?;

    let metrics = cycle.metrics();
    tracing::debug!(
        trip_id,
        comments = metrics.comment_count,
        threads = metrics.thread_count,
        max_depth = metrics.max_depth,
        "Render cycle complete"
    );

    Ok(cycle)
}

/// Like [`refresh`], but never fails: errors become `LoadState::Failed`.
pub async fn load_state(source: &CommentSource, trip_id: u64, options: &RenderOptions) -> LoadState {
    match refresh(source, trip_id, options).await {
        Ok(cycle) => LoadState::from_cycle(&cycle),
        Err(e) => LoadState::failed(&e),
    }
}
