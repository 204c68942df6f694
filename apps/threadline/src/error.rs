//! # Host Errors
//!
//! Error types for everything around the core: fetching snapshots, reading
//! configuration and writing output.

use thiserror::Error;
use threadline_core::ThreadError;

/// Failures while obtaining a comment snapshot.
///
/// Timeouts are kept apart from other transport failures so hosts can report
/// them differently.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The source could not be reached at all.
    #[error("Cannot reach comment source: {0}")]
    Unreachable(String),

    /// The source did not answer within the configured timeout.
    #[error("Comment source timed out after {0}s")]
    Timeout(u64),

    /// The source answered with a non-success HTTP status.
    #[error("Comment source returned status {0}")]
    Status(u16),

    /// The payload is not a JSON array of comment records.
    #[error("Invalid comment payload: {0}")]
    Decode(String),

    /// The snapshot is bigger than the configured limit, in bytes.
    #[error("Comment payload exceeds {0} bytes")]
    TooLarge(u64),

    /// A file source could not be read.
    #[error("Cannot read comment file: {0}")]
    Io(String),
}

/// Top-level error of the threadline host.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Thread(#[from] ThreadError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Unsupported output format: {0}")]
    UnknownFormat(String),
}
