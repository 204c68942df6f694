//! # Comment Sources
//!
//! Where snapshots come from. A snapshot is delivered whole: one JSON array
//! of comment records, no streaming and no pagination.

use crate::error::FetchError;
use reqwest::header::ACCEPT;
use std::path::PathBuf;
use std::time::Duration;
use threadline_core::CommentRecord;

/// Maximum size of a snapshot, from a file or over HTTP (50 MB).
pub const MAX_SNAPSHOT_SIZE: u64 = 50 * 1024 * 1024;

/// Decode a snapshot payload.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<CommentRecord>, FetchError> {
    serde_json::from_slice(bytes).map_err(|e| FetchError::Decode(e.to_string()))
}

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// HTTP client for the upstream comments endpoint.
#[derive(Debug, Clone)]
pub struct CommentClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    max_body: u64,
}

impl CommentClient {
    /// Create a client for the given base URL with a per-request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            timeout,
            max_body: MAX_SNAPSHOT_SIZE,
        })
    }

    /// Lower or raise the response body limit.
    #[must_use]
    pub fn with_max_body(mut self, max_body: u64) -> Self {
        self.max_body = max_body;
        self
    }

    /// `<base_url>/trip/<trip_id>/comments`
    #[must_use]
    pub fn comments_url(&self, trip_id: u64) -> String {
        format!(
            "{}/trip/{}/comments",
            self.base_url.trim_end_matches('/'),
            trip_id
        )
    }

    /// Fetch the full snapshot for a trip.
    ///
    /// Bodies over the limit are rejected from `Content-Length` when present,
    /// and otherwise as soon as the streamed body passes it.
    pub async fn fetch(&self, trip_id: u64) -> Result<Vec<CommentRecord>, FetchError> {
        let url = self.comments_url(trip_id);

        let mut resp = self
            .http
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.classify(&url, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if resp
            .content_length()
            .is_some_and(|len| len > self.max_body)
        {
            return Err(FetchError::TooLarge(self.max_body));
        }

        let mut body = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| self.classify(&url, e))? {
            let received = (body.len() as u64).saturating_add(chunk.len() as u64);
            if received > self.max_body {
                return Err(FetchError::TooLarge(self.max_body));
            }
            body.extend_from_slice(&chunk);
        }
        decode_records(&body)
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else {
            FetchError::Unreachable(format!("{url}: {err}"))
        }
    }
}

// =============================================================================
// SOURCE
// =============================================================================

/// A place snapshots can be loaded from.
#[derive(Debug, Clone)]
pub enum CommentSource {
    /// Fetch per trip from the upstream HTTP endpoint.
    Http(CommentClient),
    /// Read one fixed snapshot from a JSON file; the trip id is ignored.
    File(PathBuf),
}

impl CommentSource {
    /// Load the snapshot for a trip.
    pub async fn fetch(&self, trip_id: u64) -> Result<Vec<CommentRecord>, FetchError> {
        match self {
            Self::Http(client) => client.fetch(trip_id).await,
            Self::File(path) => {
                let metadata = tokio::fs::metadata(path)
                    .await
                    .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;
                if metadata.len() > MAX_SNAPSHOT_SIZE {
                    return Err(FetchError::TooLarge(MAX_SNAPSHOT_SIZE));
                }
                let bytes = tokio::fs::read(path)
                    .await
                    .map_err(|e| FetchError::Io(format!("{}: {}", path.display(), e)))?;
                decode_records(&bytes)
            }
        }
    }

    /// Human-readable location, for logs.
    #[must_use]
    pub fn describe(&self, trip_id: u64) -> String {
        match self {
            Self::Http(client) => client.comments_url(trip_id),
            Self::File(path) => path.display().to_string(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
