//! # Threading Benchmarks
//!
//! Performance benchmarks for threadline-core build and render.
//!
//! Run with: `cargo bench -p threadline-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use threadline_core::{CommentId, CommentRecord, RenderOptions, ThreadBuilder, ThreadRenderer, thread_comments};

fn record(id: u64, parent: u64) -> CommentRecord {
    CommentRecord::new(
        CommentId(id),
        CommentId(parent),
        "author",
        "April 5, 2018",
        "Looking forward to the trip!",
    )
}

/// Many short threads: every fifth comment starts a new one.
fn create_wide_snapshot(size: u64) -> Vec<CommentRecord> {
    (1..=size)
        .map(|id| {
            let parent = if id % 5 == 1 { 0 } else { id - 1 };
            record(id, parent)
        })
        .collect()
}

/// One root with every other comment replying to it.
fn create_star_snapshot(size: u64) -> Vec<CommentRecord> {
    (1..=size)
        .map(|id| record(id, if id == 1 { 0 } else { 1 }))
        .collect()
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [100u64, 1000, 10000].iter() {
        let records = create_wide_snapshot(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(ThreadBuilder::new().build(records)));
        });
    }

    group.finish();
}

fn bench_render_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_all");

    for size in [100u64, 1000, 10000].iter() {
        let (index, roots) = ThreadBuilder::new()
            .build(&create_star_snapshot(*size))
            .expect("build");

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| black_box(ThreadRenderer::new().render_all(&index, &roots)));
        });
    }

    group.finish();
}

fn bench_full_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_cycle");
    let options = RenderOptions::default();

    for size in [100u64, 1000, 10000].iter() {
        let records = create_wide_snapshot(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), &records, |b, records| {
            b.iter(|| black_box(thread_comments(records, &options)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build, bench_render_all, bench_full_cycle);
criterion_main!(benches);
