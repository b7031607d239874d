//! Benchmarks for the derivation pipeline

use callboard_core::{CallRecord, InteractionExchange};
use callboard_dashboard::{CallStore, DashboardView, StatusFilter, chart_series, compute_stats, filter_calls};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::sync::Arc;

/// Realistic batch: mostly ended calls, a few active, varying transcript length
fn make_calls(count: i64) -> Vec<CallRecord> {
    (1..=count)
        .map(|id| CallRecord {
            id,
            status: if id % 9 == 0 { "active" } else { "ended" }.to_string(),
            duration: (id % 9 != 0).then_some(95.0),
            interaction_log: (0..id % 7)
                .map(|i| InteractionExchange {
                    user: format!("mensaje {i}"),
                    ai: format!("respuesta {i}"),
                    timestamp: 1_710_512_730.0,
                })
                .collect(),
            user_phone: format!("+5255{id:08}"),
            start_time: Some("2024-03-15T14:25:30".to_string()),
            call_sid: format!("CA{id:032x}"),
            user_intent: None,
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");

    for size in [100_i64, 1_000, 10_000] {
        let calls = make_calls(size);
        group.throughput(Throughput::Elements(size.unsigned_abs()));

        group.bench_with_input(BenchmarkId::new("stats", size), &calls, |b, calls| {
            b.iter(|| compute_stats(black_box(calls)));
        });

        group.bench_with_input(BenchmarkId::new("filter_search", size), &calls, |b, calls| {
            let status = StatusFilter::from("ended");
            b.iter(|| filter_calls(black_box(calls), &status, "55000").len());
        });

        group.bench_with_input(BenchmarkId::new("charts", size), &calls, |b, calls| {
            b.iter(|| chart_series(black_box(calls)));
        });
    }

    group.finish();
}

fn bench_memoized_view(c: &mut Criterion) {
    let store = Arc::new(CallStore::new());
    let _ = store.replace(make_calls(10_000));
    let view = DashboardView::new(store);
    view.set_search("12");

    c.bench_function("view_snapshot_cached", |b| b.iter(|| view.snapshot().calls.len()));
}

criterion_group!(benches, bench_pipeline, bench_memoized_view);
criterion_main!(benches);
