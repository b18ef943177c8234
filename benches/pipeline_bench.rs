//! Benchmarks for the filter, aggregate and render pipeline
//!
//! Run with: cargo bench

use chrono::{Duration, NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use laku::*;
use rust_decimal::Decimal;

const ITEMS: [&str; 8] = [
    "Tea", "Coffee", "Cake", "Bun", "Croissant", "Juice", "Water", "Sandwich",
];

fn reference_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 30)
        .and_then(|d| d.and_hms_opt(18, 0, 0))
        .unwrap()
}

fn create_test_sales(count: usize) -> Vec<SaleRecord> {
    let now = reference_now();
    (0..count)
        .map(|i| {
            let price = Decimal::new(150 + (i % 20) as i64 * 25, 2);
            SaleRecord::new(i as u64 + 1, ITEMS[i % ITEMS.len()], (i % 4) as u32 + 1, price)
                .created_at(now - Duration::minutes(i as i64 * 37))
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [100, 1000, 10000] {
        let sales = create_test_sales(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("summarize_{}", size), |b| {
            b.iter(|| summarize(black_box(&sales)))
        });
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let sales = create_test_sales(10000);
    let now = reference_now();
    group.throughput(Throughput::Elements(sales.len() as u64));

    for mode in [SummaryMode::Server, SummaryMode::Snapshot, SummaryMode::Filtered] {
        let view = SalesView::new().with_summary_mode(mode);
        let server = summarize(&sales);

        group.bench_function(format!("week_query_{}", mode), |b| {
            b.iter(|| {
                view.render(
                    black_box(&sales),
                    TimeWindow::Week,
                    "tea",
                    now,
                    Some(&server),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_render);
criterion_main!(benches);
