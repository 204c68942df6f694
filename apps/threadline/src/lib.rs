//! # threadline
//!
//! Host around `threadline-core`: fetches trip comment snapshots, runs a
//! render cycle per refresh and hands the result to a display surface.
//!
//! - [`source`]: HTTP and file comment sources
//! - [`refresh`]: one fetch-build-render pass and its `LoadState`
//! - [`emit`]: text, HTML and JSON emitters
//! - [`api`]: axum HTTP host
//! - [`cli`]: clap command line

pub mod api;
pub mod cli;
pub mod config;
pub mod emit;
pub mod error;
pub mod refresh;
pub mod source;

pub use config::Config;
pub use error::{AppError, FetchError};
pub use refresh::{LoadState, load_state, refresh};
pub use source::CommentSource;
