//! # API Response Types
//!
//! JSON structures returned by the HTTP host.

use serde::{Deserialize, Serialize};
use threadline_core::{RenderedNode, ThreadMetrics};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// THREADS RESPONSE
// =============================================================================

/// Rendered threads of one trip, root-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadsResponse {
    pub trip_id: u64,
    pub threads: Vec<RenderedNode>,
    pub metrics: ThreadMetrics,
}

// =============================================================================
// STATS RESPONSE
// =============================================================================

/// Thread metrics of one trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub trip_id: u64,
    #[serde(flatten)]
    pub metrics: ThreadMetrics,
    pub replies_per_thread_milli: u64,
}

impl StatsResponse {
    #[must_use]
    pub fn new(trip_id: u64, metrics: ThreadMetrics) -> Self {
        Self {
            trip_id,
            replies_per_thread_milli: metrics.replies_per_thread_milli(),
            metrics,
        }
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

/// Body of every non-2xx JSON response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
