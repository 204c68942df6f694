//! # Configuration
//!
//! Layered host configuration:
//!
//! 1. Built-in defaults
//! 2. `threadline.toml` (or the file given with `--config`)
//! 3. Environment variables
//! 4. CLI flags (applied by the command layer)
//!
//! ## Environment Variables
//!
//! - `THREADLINE_URL`: Base URL of the comment source
//! - `THREADLINE_TIMEOUT_SECS`: Fetch timeout in seconds
//! - `THREADLINE_RATE_LIMIT`: Server requests per second (0 disables)
//! - `THREADLINE_CORS_ORIGINS`: Comma-separated allowed origins, or "*"

use crate::error::{AppError, FetchError};
use crate::source::{CommentClient, CommentSource};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use threadline_core::RenderOptions;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "threadline.toml";

/// Maximum size of a config file (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// SECTIONS
// =============================================================================

/// Where comment snapshots come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL; snapshots are fetched from `<base_url>/trip/<id>/comments`.
    pub base_url: String,
    pub timeout_secs: u64,
    /// Read snapshots from this JSON file instead of fetching them.
    pub file: Option<PathBuf>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 10,
            file: None,
        }
    }
}

/// HTTP host settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second, 0 disables rate limiting.
    pub rate_limit: u32,
    /// Comma-separated origins, `*` for any, unset for localhost only.
    pub cors_origins: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: 100,
            cors_origins: None,
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// Complete host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub render: RenderOptions,
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from an explicit path, the default file, or defaults.
    ///
    /// An explicit path must exist; the default file is optional.
    /// Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self, AppError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            AppError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(AppError::Config(format!(
                "'{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Parse TOML text. Missing sections and keys keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, AppError> {
        toml::from_str(text).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Apply `THREADLINE_*` environment overrides.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("THREADLINE_URL") {
            self.source.base_url = url;
        }
        if let Some(secs) = lookup("THREADLINE_TIMEOUT_SECS").and_then(|s| s.parse().ok()) {
            self.source.timeout_secs = secs;
        }
        if let Some(rps) = lookup("THREADLINE_RATE_LIMIT").and_then(|s| s.parse().ok()) {
            self.server.rate_limit = rps;
        }
        if let Some(origins) = lookup("THREADLINE_CORS_ORIGINS") {
            self.server.cors_origins = Some(origins);
        }
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.source.timeout_secs)
    }

    /// Build the comment source this configuration points at.
    pub fn comment_source(&self) -> Result<CommentSource, FetchError> {
        match &self.source.file {
            Some(path) => Ok(CommentSource::File(path.clone())),
            None => Ok(CommentSource::Http(CommentClient::new(
                self.source.base_url.clone(),
                self.timeout(),
            )?)),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
