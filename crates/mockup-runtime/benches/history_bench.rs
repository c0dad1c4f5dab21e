//! Benchmarks for history pushes and autosave scheduling.
//!
//! Run with: cargo bench -p mockup-runtime --bench history_bench
//!
//! The interesting cases are pushes at the depth limit (eviction on every
//! push) and the per-keystroke `observe` path, which must stay cheap because
//! hosts call it after every edit.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

use mockup_runtime::{
    Duration, History, HistoryConfig, Instant, MemoryStorage, PersistConfig, PersistenceAgent,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Doc {
    messages: Vec<String>,
    dark_mode: bool,
}

fn doc(n: usize) -> Doc {
    Doc {
        messages: (0..n).map(|i| format!("message {i}")).collect(),
        dark_mode: false,
    }
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("history/push");
    for depth in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::new("at_limit", depth), &depth, |b, &depth| {
            let mut history = History::new(0u64, HistoryConfig::new(depth));
            for i in 1..=depth as u64 {
                history.push(i);
            }
            let mut next = depth as u64;
            b.iter(|| {
                next += 1;
                black_box(history.push(next));
            });
        });
    }
    group.finish();
}

fn bench_undo_redo(c: &mut Criterion) {
    let mut history = History::new(doc(20), HistoryConfig::default());
    for i in 0..50 {
        history.push_with(|d| {
            let mut d = d.clone();
            d.messages.push(format!("extra {i}"));
            d
        });
    }
    c.bench_function("history/undo_redo", |b| {
        b.iter(|| {
            black_box(history.undo());
            black_box(history.redo());
        });
    });
}

fn bench_observe(c: &mut Criterion) {
    let seed = doc(20);
    let (mut agent, _) = PersistenceAgent::open(
        PersistConfig::new("bench").with_debounce(Duration::from_secs(3600)),
        MemoryStorage::new(),
        &seed,
    );
    let a = Arc::new(doc(21));
    let b2 = Arc::new(doc(22));
    let now = Instant::now();
    c.bench_function("autosave/observe", |b| {
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            agent.observe(if flip { &a } else { &b2 }, now);
        });
    });
}

fn bench_save_now(c: &mut Criterion) {
    let seed = doc(0);
    let (mut agent, _) =
        PersistenceAgent::open(PersistConfig::new("bench"), MemoryStorage::new(), &seed);
    let mut group = c.benchmark_group("autosave/save_now");
    for n in [10usize, 100] {
        let snapshot = Arc::new(doc(n));
        group.bench_with_input(BenchmarkId::from_parameter(n), &snapshot, |b, snapshot| {
            b.iter(|| black_box(agent.save_now(snapshot)));
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_push,
    bench_undo_redo,
    bench_observe,
    bench_save_now
);
criterion_main!(benches);
