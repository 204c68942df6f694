//! # threadline
//!
//! The binary for the threadline comment threading engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                apps/threadline (THE BINARY)              │
//! │                                                          │
//! │  ┌─────────────┐   ┌─────────────┐   ┌───────────────┐  │
//! │  │    CLI      │   │  HTTP API   │   │ CommentSource │  │
//! │  │   (clap)    │   │   (axum)    │   │   (reqwest)   │  │
//! │  └──────┬──────┘   └──────┬──────┘   └───────┬───────┘  │
//! │         └─────────────────┼──────────────────┘          │
//! │                           ▼                             │
//! │                 ┌──────────────────┐                    │
//! │                 │ threadline-core  │                    │
//! │                 │   (THE LOGIC)    │                    │
//! │                 └──────────────────┘                    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Print the threads of trip 6 from the default source
//! threadline render 6
//!
//! # Render a saved snapshot as an HTML fragment
//! threadline render 6 --file comments.json --format html
//!
//! # Start the HTTP server
//! threadline serve --host 0.0.0.0 --port 8080
//! ```

use clap::Parser;
use threadline::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // THREADLINE_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("THREADLINE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "threadline=debug,tower_http=debug"
    } else if cli.quiet {
        "threadline=warn"
    } else {
        "threadline=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr so rendered output on stdout stays clean.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}
