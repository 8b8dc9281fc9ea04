use chrono::{Days, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_decimal::Decimal;
use vitalrs::{
    fill_missing_days, ChartLabelGenerator, DailyRecord, Metric, MetricsAggregator, RangeKey,
    RangeResolver,
};

/// Aggregation benchmarks across the three range sizes

fn create_daily_series(today: NaiveDate, days: u64) -> Vec<DailyRecord> {
    (0..days)
        .map(|offset| {
            let date = today - Days::new(days - 1 - offset);
            DailyRecord {
                steps: Some(Decimal::from(4000 + (offset * 137) % 9000)),
                calories: Some(Decimal::from(150 + (offset * 31) % 400)),
                heart_rate: Some(Decimal::from(58 + offset % 25)),
                sleep_hours: Some(Decimal::new(55 + (offset % 35) as i64, 1)),
                date,
            }
        })
        .collect()
}

fn bench_aggregate(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 9, 22).unwrap();
    let mut group = c.benchmark_group("Metrics Aggregation");

    for key in [RangeKey::Week, RangeKey::Month, RangeKey::Quarter] {
        let records = create_daily_series(today, key.window_days());

        group.throughput(Throughput::Elements(records.len() as u64));
        group.bench_with_input(BenchmarkId::new("aggregate", key), &records, |b, records| {
            b.iter(|| MetricsAggregator::aggregate(black_box(records), Metric::Steps, key).unwrap());
        });
    }

    group.finish();
}

fn bench_fill_and_bucket(c: &mut Criterion) {
    let today = NaiveDate::from_ymd_opt(2024, 9, 22).unwrap();
    let window = RangeResolver::resolve(RangeKey::Quarter, today);
    // every third day missing
    let sparse: Vec<DailyRecord> = create_daily_series(today, 90)
        .into_iter()
        .enumerate()
        .filter(|(i, _)| i % 3 != 0)
        .map(|(_, r)| r)
        .collect();

    let mut group = c.benchmark_group("Quarter Chart");
    group.bench_function("fill_missing_days", |b| {
        b.iter(|| fill_missing_days(black_box(&window), black_box(&sparse)));
    });

    let dense = fill_missing_days(&window, &sparse);
    group.bench_function("weekly_buckets", |b| {
        b.iter(|| MetricsAggregator::weekly_buckets(black_box(&dense), Metric::SleepHours).unwrap());
    });
    group.bench_function("labels", |b| {
        b.iter(|| ChartLabelGenerator::labels_for_records(black_box(&dense), RangeKey::Quarter));
    });

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_fill_and_bucket);
criterion_main!(benches);
