//! # API Endpoint Handlers
//!
//! Every request runs its own refresh. No index or forest is kept between
//! requests.

use super::{
    AppState,
    types::{ErrorResponse, HealthResponse, StatsResponse, ThreadsResponse},
};
use crate::emit::{Emitter, HtmlEmitter};
use crate::error::{AppError, FetchError};
use crate::refresh::{LoadState, refresh};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

// =============================================================================
// ERROR MAPPING
// =============================================================================

/// HTTP status for a failed refresh.
///
/// - Upstream timeout: 504
/// - Any other upstream failure: 502
/// - Snapshot that cannot be threaded: 422
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Fetch(FetchError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
        AppError::Fetch(_) => StatusCode::BAD_GATEWAY,
        AppError::Thread(_) => StatusCode::UNPROCESSABLE_ENTITY,
        AppError::Config(_) | AppError::Io(_) | AppError::UnknownFormat(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn error_response(err: &AppError) -> Response {
    (
        status_for(err),
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// THREADS HANDLERS
// =============================================================================

/// Rendered threads of a trip as JSON.
pub async fn threads_handler(
    State(state): State<AppState>,
    Path(trip_id): Path<u64>,
) -> Response {
    match refresh(&state.source, trip_id, &state.options).await {
        Ok(cycle) => {
            let metrics = cycle.metrics();
            let response = ThreadsResponse {
                trip_id,
                threads: cycle.into_forest(),
                metrics,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Rendered threads of a trip as an HTML fragment.
///
/// Failures still produce a fragment, showing the failed-to-load notice.
pub async fn threads_html_handler(
    State(state): State<AppState>,
    Path(trip_id): Path<u64>,
) -> Response {
    let (status, load) = match refresh(&state.source, trip_id, &state.options).await {
        Ok(cycle) => (StatusCode::OK, LoadState::from_cycle(&cycle)),
        Err(e) => (status_for(&e), LoadState::failed(&e)),
    };

    match HtmlEmitter.emit(&load) {
        Ok(body) => (status, Html(body)).into_response(),
        Err(e) => error_response(&e),
    }
}

// =============================================================================
// STATS HANDLER
// =============================================================================

/// Thread metrics of a trip.
pub async fn stats_handler(State(state): State<AppState>, Path(trip_id): Path<u64>) -> Response {
    match refresh(&state.source, trip_id, &state.options).await {
        Ok(cycle) => (
            StatusCode::OK,
            Json(StatsResponse::new(trip_id, cycle.metrics())),
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}
