//! # threadline CLI Module
//!
//! This module implements the CLI interface for threadline.
//!
//! ## Available Commands
//!
//! - `render` - Fetch a trip's comments and print the rendered threads
//! - `stats` - Print thread metrics for a trip
//! - `check` - Validate a snapshot (duplicates, orphans, cycles)
//! - `serve` - Start the HTTP server

mod commands;

use crate::config::Config;
use crate::error::AppError;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// threadline - threaded trip comments
///
/// Turns a flat list of trip comments into nested reply threads.
#[derive(Parser, Debug)]
#[command(name = "threadline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the config file (defaults to ./threadline.toml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Where to read a snapshot from, overriding `[source]`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    /// Trip whose comments are threaded
    pub trip_id: u64,

    /// Read the snapshot from a JSON file instead of fetching it
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// Base URL of the comment source
    #[arg(short, long)]
    pub url: Option<String>,

    /// Fetch timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

/// Threading and rendering options, overriding `[render]`.
#[derive(Args, Debug, Clone, Default)]
pub struct RenderArgs {
    /// Attribution policy (augment, replace)
    #[arg(short, long)]
    pub attribution: Option<String>,

    /// Orphan policy (reject, promote)
    #[arg(short, long)]
    pub orphans: Option<String>,

    /// Pixels of indentation per nesting level
    #[arg(short, long)]
    pub indent_unit: Option<u32>,

    /// Deepest nesting level to render (unbounded when unset)
    #[arg(long)]
    pub max_depth: Option<usize>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the comment threads of a trip
    Render {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        render: RenderArgs,

        /// Output format (text, html, json)
        #[arg(short = 't', long, default_value = "text")]
        format: String,
    },

    /// Show thread metrics for a trip
    Stats {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Validate a snapshot without rendering it
    Check {
        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        render: RenderArgs,
    },

    /// Start HTTP server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let mut config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Render {
            source,
            render,
            format,
        }) => {
            apply_source_args(&mut config, &source);
            apply_render_args(&mut config, &render)?;
            let format = if json_mode { "json" } else { format.as_str() };
            cmd_render(&config, source.trip_id, format).await
        }
        Some(Commands::Stats { source, render }) => {
            apply_source_args(&mut config, &source);
            apply_render_args(&mut config, &render)?;
            cmd_stats(&config, source.trip_id, json_mode).await
        }
        Some(Commands::Check { source, render }) => {
            apply_source_args(&mut config, &source);
            apply_render_args(&mut config, &render)?;
            cmd_check(&config, source.trip_id, json_mode).await
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            cmd_serve(&config, cli.quiet).await
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| AppError::Io(e.to_string())),
    }
}
