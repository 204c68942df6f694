//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::{RenderArgs, SourceArgs};
use crate::api::{self, AppState, StatsResponse};
use crate::config::Config;
use crate::emit::OutputFormat;
use crate::error::AppError;
use crate::refresh::{LoadState, refresh};
use serde::Serialize;
use std::collections::BTreeSet;
use threadline_core::{
    AttributionPolicy, CommentId, CommentRecord, OrphanPolicy, RenderOptions, ThreadBuilder,
    ThreadError, ThreadIndex,
};

// =============================================================================
// FLAG OVERRIDES
// =============================================================================

/// Apply source flags on top of the loaded configuration.
pub fn apply_source_args(config: &mut Config, args: &SourceArgs) {
    if let Some(file) = &args.file {
        config.source.file = Some(file.clone());
    }
    if let Some(url) = &args.url {
        config.source.base_url = url.clone();
        // an explicit URL wins over a file from the config
        if args.file.is_none() {
            config.source.file = None;
        }
    }
    if let Some(secs) = args.timeout {
        config.source.timeout_secs = secs;
    }
}

/// Apply render flags on top of the loaded configuration.
pub fn apply_render_args(config: &mut Config, args: &RenderArgs) -> Result<(), AppError> {
    if let Some(attribution) = &args.attribution {
        config.render.attribution = parse_attribution(attribution)?;
    }
    if let Some(orphans) = &args.orphans {
        config.render.orphans = parse_orphans(orphans)?;
    }
    if let Some(unit) = args.indent_unit {
        config.render.indent_unit = unit;
    }
    if let Some(max) = args.max_depth {
        config.render.max_depth = Some(max);
    }
    Ok(())
}

fn parse_attribution(value: &str) -> Result<AttributionPolicy, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "augment" => Ok(AttributionPolicy::Augment),
        "replace" => Ok(AttributionPolicy::Replace),
        other => Err(AppError::Config(format!(
            "Unknown attribution policy '{}' (expected augment or replace)",
            other
        ))),
    }
}

fn parse_orphans(value: &str) -> Result<OrphanPolicy, AppError> {
    match value.to_ascii_lowercase().as_str() {
        "reject" => Ok(OrphanPolicy::Reject),
        "promote" => Ok(OrphanPolicy::Promote),
        other => Err(AppError::Config(format!(
            "Unknown orphan policy '{}' (expected reject or promote)",
            other
        ))),
    }
}

// =============================================================================
// RENDER COMMAND
// =============================================================================

/// Render the threads of a trip and print them.
///
/// A failed refresh still prints the failed-to-load output before the error
/// is returned.
pub async fn cmd_render(config: &Config, trip_id: u64, format: &str) -> Result<(), AppError> {
    let format: OutputFormat = format.parse()?;
    let source = config.comment_source()?;

    let (state, outcome) = match refresh(&source, trip_id, &config.render).await {
        Ok(cycle) => (LoadState::from_cycle(&cycle), Ok(())),
        Err(e) => (LoadState::failed(&e), Err(e)),
    };

    print!("{}", format.emitter().emit(&state)?);
    outcome
}

// =============================================================================
// STATS COMMAND
// =============================================================================

/// Show thread metrics for a trip.
pub async fn cmd_stats(config: &Config, trip_id: u64, json_mode: bool) -> Result<(), AppError> {
    let source = config.comment_source()?;
    let cycle = refresh(&source, trip_id, &config.render).await?;
    let stats = StatsResponse::new(trip_id, cycle.metrics());

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&stats).unwrap_or_default()
        );
        return Ok(());
    }

    println!("Trip {} Comments", trip_id);
    println!("==================");
    println!("Source:   {}", source.describe(trip_id));
    println!();
    println!("Comments:       {}", stats.metrics.comment_count);
    println!("Threads:        {}", stats.metrics.thread_count);
    println!("Replies:        {}", stats.metrics.reply_count);
    println!("Max Depth:      {}", stats.metrics.max_depth);
    println!("Largest Thread: {}", stats.metrics.largest_thread);
    println!(
        "Replies/Thread: {} per thousand",
        stats.replies_per_thread_milli
    );

    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// A reply whose parent is not in the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Orphan {
    pub id: CommentId,
    pub parent: CommentId,
}

/// Everything wrong with a snapshot, found in one pass.
///
/// Judged against the same `RenderOptions` a render cycle would use, so
/// `first_error` is the error that cycle fails with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub options: RenderOptions,
    pub comment_count: usize,
    pub root_count: usize,
    /// Ids that occur more than once; the later record is the one threaded.
    pub duplicates: Vec<CommentId>,
    pub orphans: Vec<Orphan>,
    /// One member per parent cycle, the one a render cycle would name.
    pub cycles: Vec<CommentId>,
    /// Comments no root reaches: cycle members and their replies.
    pub unreachable: Vec<CommentId>,
    /// Shallowest comments nested past `options.max_depth`, in render order.
    pub too_deep: Vec<CommentId>,
}

impl CheckReport {
    /// Inspect a snapshot. Unlike a render cycle this does not stop at the
    /// first problem.
    pub fn from_records(
        records: &[CommentRecord],
        options: &RenderOptions,
    ) -> Result<Self, ThreadError> {
        let (index, roots) = ThreadBuilder::new()
            .with_orphan_policy(OrphanPolicy::Promote)
            .build(records)?;

        let orphans: Vec<Orphan> = roots
            .iter()
            .filter_map(|&id| index.get(id))
            .filter(|node| !node.parent().is_root())
            .map(|node| Orphan {
                id: node.id(),
                parent: node.parent(),
            })
            .collect();

        let true_roots = roots.len().saturating_sub(orphans.len());
        let unreachable = index.unreachable(&roots);

        // first member seen per cycle, keyed by the cycle's smallest id
        let mut seen_cycles = BTreeSet::new();
        let cycles: Vec<CommentId> = unreachable
            .iter()
            .filter_map(|&id| index.cycle_member(id))
            .filter(|&member| {
                smallest_in_cycle(&index, member).is_some_and(|key| seen_cycles.insert(key))
            })
            .collect();

        let too_deep = match options.max_depth {
            Some(max) => nested_past(&index, &roots, max),
            None => Vec::new(),
        };

        Ok(Self {
            options: *options,
            comment_count: index.len(),
            root_count: true_roots,
            duplicates: ThreadBuilder::duplicate_ids(records),
            orphans,
            cycles,
            unreachable,
            too_deep,
        })
    }

    /// Whether a render cycle with these options would accept the snapshot.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.first_error().is_none()
    }

    /// The error a render cycle with these options would fail with.
    ///
    /// Orphans only count under `OrphanPolicy::Reject`.
    #[must_use]
    pub fn first_error(&self) -> Option<ThreadError> {
        if self.options.orphans == OrphanPolicy::Reject {
            if let Some(orphan) = self.orphans.first() {
                return Some(ThreadError::MissingParent {
                    id: orphan.id,
                    parent: orphan.parent,
                });
            }
        }
        if let Some(&id) = self.cycles.first() {
            return Some(ThreadError::CyclicReference { id });
        }
        let max = self.options.max_depth?;
        self.too_deep
            .first()
            .map(|&id| ThreadError::DepthLimitExceeded { id, depth: max })
    }
}

/// Pre-order walk from `roots` collecting comments at depth `max + 1`.
///
/// The walk does not descend below them, matching where rendering stops.
fn nested_past(index: &ThreadIndex, roots: &[CommentId], max: usize) -> Vec<CommentId> {
    let mut found = Vec::new();
    let mut visited = BTreeSet::new();
    let mut stack: Vec<(CommentId, usize)> = roots.iter().rev().map(|&id| (id, 0)).collect();

    while let Some((id, depth)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if depth > max {
            found.push(id);
            continue;
        }
        if let Some(replies) = index.replies_of(id) {
            stack.extend(replies.iter().rev().map(|&reply| (reply, depth.saturating_add(1))));
        }
    }
    found
}

/// Walk once around the cycle containing `member` and return its smallest id.
fn smallest_in_cycle(index: &ThreadIndex, member: CommentId) -> Option<CommentId> {
    let mut smallest = member;
    let mut current = index.parent_of(member)?;
    while current != member {
        smallest = smallest.min(current);
        current = index.parent_of(current)?;
    }
    Some(smallest)
}

/// Validate a snapshot and report duplicates, orphans, cycles and comments
/// nested past the configured ceiling.
pub async fn cmd_check(config: &Config, trip_id: u64, json_mode: bool) -> Result<(), AppError> {
    let source = config.comment_source()?;
    let records = source.fetch(trip_id).await?;
    let report = CheckReport::from_records(&records, &config.render)?;

    if json_mode {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).unwrap_or_default()
        );
    } else {
        println!("Snapshot Check: {}", source.describe(trip_id));
        println!("==================");
        println!("Comments:   {}", report.comment_count);
        println!("Threads:    {}", report.root_count);
        println!("Duplicates: {}", join_ids(&report.duplicates));
        println!(
            "Orphans:    {}",
            if report.orphans.is_empty() {
                "none".to_string()
            } else {
                report
                    .orphans
                    .iter()
                    .map(|o| format!("{} -> {}", o.id, o.parent))
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        );
        println!("Cycles:     {}", join_ids(&report.cycles));
        println!("Unreachable: {}", join_ids(&report.unreachable));
        if let Some(max) = report.options.max_depth {
            println!("Too deep:   {} (max depth {})", join_ids(&report.too_deep), max);
        }
        println!();
        println!("{}", if report.is_clean() { "OK" } else { "INVALID" });
    }

    match report.first_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

fn join_ids(ids: &[CommentId]) -> String {
    if ids.is_empty() {
        return "none".to_string();
    }
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// SERVE COMMAND
// =============================================================================

/// Start the HTTP server.
pub async fn cmd_serve(config: &Config, quiet: bool) -> Result<(), AppError> {
    let source = config.comment_source()?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    if !quiet {
        println!("threadline HTTP Server Starting...");
        println!();
        println!("Configuration:");
        println!("  Address:    {}", addr);
        match &config.source.file {
            Some(path) => println!("  Source:     {} (fixed snapshot)", path.display()),
            None => println!("  Source:     {}", config.source.base_url),
        }
        println!("  Rate limit: {} req/s", config.server.rate_limit);
        println!();
        println!("Endpoints:");
        println!("  GET /health                       - Health check");
        println!("  GET /trips/{{trip_id}}/threads      - Rendered threads (JSON)");
        println!("  GET /trips/{{trip_id}}/threads.html - Rendered threads (HTML)");
        println!("  GET /trips/{{trip_id}}/stats        - Thread metrics");
        println!();
        println!("Press Ctrl+C to stop");
        println!();
    }

    let state = AppState::new(source, config.render, config.server.clone());
    api::run_server(&addr, state).await
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use threadline_core::thread_comments;

    fn record(id: u64, parent: u64) -> CommentRecord {
        CommentRecord::new(CommentId(id), CommentId(parent), "Ana", "t", "x")
    }

    fn check(records: &[CommentRecord]) -> CheckReport {
        CheckReport::from_records(records, &RenderOptions::default()).expect("check")
    }

    fn chain(len: u64) -> Vec<CommentRecord> {
        (1..=len).map(|id| record(id, id - 1)).collect()
    }

    #[test]
    fn clean_snapshot_passes() {
        let report = check(&[record(1, 0), record(2, 1), record(3, 0)]);

        assert!(report.is_clean());
        assert_eq!(report.comment_count, 3);
        assert_eq!(report.root_count, 2);
        assert!(report.unreachable.is_empty());
        assert_eq!(report.first_error(), None);
    }

    #[test]
    fn reports_every_orphan() {
        let report = check(&[record(1, 0), record(2, 40), record(3, 50)]);

        assert_eq!(
            report.orphans,
            vec![
                Orphan {
                    id: CommentId(2),
                    parent: CommentId(40)
                },
                Orphan {
                    id: CommentId(3),
                    parent: CommentId(50)
                },
            ]
        );
        assert_eq!(report.root_count, 1);
        assert_eq!(
            report.first_error(),
            Some(ThreadError::MissingParent {
                id: CommentId(2),
                parent: CommentId(40)
            })
        );
    }

    #[test]
    fn reports_each_cycle_once() {
        // 2 <-> 3 form a cycle and 4 hangs below it; 5 replies to itself
        let report = check(&[
            record(1, 0),
            record(2, 3),
            record(3, 2),
            record(4, 3),
            record(5, 5),
        ]);

        assert_eq!(report.cycles, vec![CommentId(2), CommentId(5)]);
        assert_eq!(
            report.unreachable,
            vec![CommentId(2), CommentId(3), CommentId(4), CommentId(5)]
        );
        assert!(!report.is_clean());
        assert_eq!(
            report.first_error(),
            Some(ThreadError::CyclicReference { id: CommentId(2) })
        );
    }

    #[test]
    fn duplicates_do_not_make_snapshot_invalid() {
        let report = check(&[record(1, 0), record(1, 0)]);
        assert_eq!(report.duplicates, vec![CommentId(1)]);
        assert!(report.is_clean());
    }

    #[test]
    fn cycle_named_like_render_cycle() {
        // 3 is listed before 2, so a render cycle names 3 rather than the smallest id
        let records = [record(1, 0), record(3, 2), record(2, 3)];
        let options = RenderOptions::default();

        let report = CheckReport::from_records(&records, &options).expect("check");

        assert_eq!(report.cycles, vec![CommentId(3)]);
        assert_eq!(
            report.first_error(),
            thread_comments(&records, &options).err()
        );
    }

    #[test]
    fn first_error_agrees_with_render_cycle() {
        let promote = RenderOptions {
            orphans: OrphanPolicy::Promote,
            ..RenderOptions::default()
        };
        let capped = RenderOptions {
            max_depth: Some(2),
            ..RenderOptions::default()
        };
        let cases: Vec<(Vec<CommentRecord>, RenderOptions)> = vec![
            (vec![record(1, 0), record(2, 1)], RenderOptions::default()),
            (vec![record(1, 0), record(2, 9)], RenderOptions::default()),
            (vec![record(1, 0), record(2, 9)], promote),
            (vec![record(2, 9), record(4, 5), record(5, 4)], promote),
            (vec![record(5, 5), record(7, 8), record(8, 7)], RenderOptions::default()),
            (chain(6), capped),
            (chain(3), capped),
            (vec![record(1, 0), record(2, 1), record(3, 2), record(4, 3), record(5, 1)], capped),
        ];

        for (records, options) in cases {
            let report = CheckReport::from_records(&records, &options).expect("check");
            let rendered = thread_comments(&records, &options);

            assert_eq!(report.first_error(), rendered.as_ref().err().cloned());
            assert_eq!(report.is_clean(), rendered.is_ok());
        }
    }

    #[test]
    fn promoted_orphans_are_listed_but_clean() {
        let options = RenderOptions {
            orphans: OrphanPolicy::Promote,
            ..RenderOptions::default()
        };

        let report =
            CheckReport::from_records(&[record(1, 0), record(2, 9)], &options).expect("check");

        assert_eq!(report.orphans.len(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn reports_comments_past_depth_ceiling() {
        let options = RenderOptions {
            max_depth: Some(1),
            ..RenderOptions::default()
        };
        // two branches cross the ceiling; nothing below 3 is listed again
        let records = [
            record(1, 0),
            record(2, 1),
            record(3, 2),
            record(4, 3),
            record(5, 0),
            record(6, 5),
            record(7, 6),
        ];

        let report = CheckReport::from_records(&records, &options).expect("check");

        assert_eq!(report.too_deep, vec![CommentId(3), CommentId(7)]);
        assert!(!report.is_clean());
        assert_eq!(
            report.first_error(),
            Some(ThreadError::DepthLimitExceeded {
                id: CommentId(3),
                depth: 1
            })
        );
    }

    #[test]
    fn depth_is_unchecked_without_ceiling() {
        let report = check(&chain(1000));

        assert!(report.too_deep.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn url_flag_overrides_configured_file() {
        let mut config = Config::default();
        config.source.file = Some(PathBuf::from("snapshot.json"));

        apply_source_args(
            &mut config,
            &SourceArgs {
                trip_id: 6,
                url: Some("http://comments.local".into()),
                ..SourceArgs::default()
            },
        );

        assert_eq!(config.source.file, None);
        assert_eq!(config.source.base_url, "http://comments.local");
    }

    #[test]
    fn render_flags_are_validated() {
        let mut config = Config::default();

        apply_render_args(
            &mut config,
            &RenderArgs {
                attribution: Some("Replace".into()),
                orphans: Some("promote".into()),
                indent_unit: Some(12),
                max_depth: Some(40),
            },
        )
        .expect("valid flags");

        assert_eq!(config.render.attribution, AttributionPolicy::Replace);
        assert_eq!(config.render.orphans, OrphanPolicy::Promote);
        assert_eq!(config.render.indent_unit, 12);
        assert_eq!(config.render.max_depth, Some(40));

        let bad = apply_render_args(
            &mut config,
            &RenderArgs {
                orphans: Some("ignore".into()),
                ..RenderArgs::default()
            },
        );
        assert!(matches!(bad, Err(AppError::Config(_))));
    }
}
