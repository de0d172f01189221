//! Dispatch path benchmark suite.
//!
//! Benchmarks the in-process work done per capture:
//! - Tag parsing at different input sizes
//! - Store command encoding
//! - Tracker event handling with observers
//! - Full dispatch into a no-op sink
//!
//! Run with: cargo bench --bench dispatch
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dfs_capture::{
    CaptureCommand, Command, CommandDispatcher, ConnectionEvent, ConnectionId, ConnectionTracker,
    MessageSink, parse_tags,
};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const TAG_COUNTS: &[usize] = &[0, 8, 64];
const OBSERVER_COUNTS: &[usize] = &[0, 1, 16];

// ============================================================================
// Helpers
// ============================================================================

/// Sink that accepts and discards every payload.
struct NullSink;

impl MessageSink for NullSink {
    fn send_text(&self, payload: String) -> bool {
        black_box(payload);
        true
    }
}

fn raw_tags(count: usize) -> String {
    (0..count)
        .map(|i| format!("tag{i},"))
        .collect::<Vec<_>>()
        .join("  ")
}

fn connected_tracker() -> ConnectionTracker {
    let mut tracker = ConnectionTracker::new(ConnectionId::generate());
    tracker.on_event(ConnectionEvent::Opened);
    tracker
}

// ============================================================================
// Benchmark: Tag Parsing
// ============================================================================

fn bench_parse_tags(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_tags");

    for &count in TAG_COUNTS {
        let input = raw_tags(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &input, |b, input| {
            b.iter(|| parse_tags(black_box(input)));
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Encoding
// ============================================================================

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");

    for &count in TAG_COUNTS {
        let command = Command::from(CaptureCommand::new(
            "https://doc.rust-lang.org/book/",
            "The Rust Programming Language",
            &raw_tags(count),
        ));
        group.bench_with_input(BenchmarkId::from_parameter(count), &command, |b, command| {
            b.iter(|| black_box(command).encode());
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Tracker Lifecycle
// ============================================================================

fn bench_tracker_lifecycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracker_lifecycle");

    for &observers in OBSERVER_COUNTS {
        group.bench_with_input(
            BenchmarkId::from_parameter(observers),
            &observers,
            |b, &observers| {
                b.iter(|| {
                    let mut tracker = ConnectionTracker::new(ConnectionId::generate());
                    for _ in 0..observers {
                        tracker.subscribe(|change| {
                            black_box(change.message());
                        });
                    }
                    tracker.on_event(ConnectionEvent::Opened);
                    tracker.on_event(ConnectionEvent::errored("reset"));
                    tracker.on_event(ConnectionEvent::closed());
                    tracker.status()
                });
            },
        );
    }

    group.finish();
}

// ============================================================================
// Benchmark: Dispatch
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let tracker = connected_tracker();
    let sink = NullSink;
    let tags = raw_tags(8);

    c.bench_function("dispatch", |b| {
        b.iter(|| {
            CommandDispatcher::new(&tracker, &sink).dispatch(
                black_box(&tags),
                "https://tokio.rs",
                "Tokio",
            )
        });
    });
}

criterion_group!(
    benches,
    bench_parse_tags,
    bench_encode,
    bench_tracker_lifecycle,
    bench_dispatch
);
criterion_main!(benches);
