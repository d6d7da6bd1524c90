// File: crates/logbook-core/benches/ohlc_bench.rs
// Summary: Candlestick bucketing throughput over generated material logs.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use logbook_core::{Attribute, ChartKind, Configuration, Context, Directive, DomainRules, Material, Relation, Value};
use serde_json::json;

fn gen_log(n: usize) -> Relation {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)).unwrap();
    let mut fuel = 100_000.0f64;
    let tuples = (0..n)
        .map(|i| {
            fuel += if i % 3 == 0 { -120.0 } else { 75.0 };
            let value = if i % 97 == 0 { Value::Null } else { Value::Number(fuel) };
            vec![Value::DateTime(start + Duration::minutes(15 * i as i64)), value]
        })
        .collect();
    Relation::new(vec![Attribute::DateTime, Attribute::Material(Material::Fuel)], tuples).unwrap()
}

fn bench_bucketing(c: &mut Criterion) {
    let configuration = Configuration::from_value(json!({
        "locale": "en",
        "legend": { "en": { "Materials": { "title": "Materials", "Fuel": "Fuel" } } }
    }));
    let rules = DomainRules::default();
    let context = Context::new(&configuration, &rules);

    let mut group = c.benchmark_group("candlestick_rows");
    for &n in &[10_000usize, 100_000usize] {
        let relation = gen_log(n);
        for period in ["Daily", "Weekly", "Monthly"] {
            group.bench_with_input(BenchmarkId::from_parameter(format!("n{n}_{period}")), &period, |b, &p| {
                b.iter(|| {
                    let table = logbook_core::Table::new(
                        ChartKind::Candlestick,
                        &relation,
                        Directive::with_option("Fuel", p),
                        context,
                    )
                    .unwrap();
                    black_box(table.rows().unwrap().len());
                });
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_bucketing);
criterion_main!(benches);
