//! Typed Value Update Benchmarks
//!
//! These benchmarks measure the performance of:
//! - Reusing one multi-polygon container across point updates
//! - Absorbing nested coordinate arrays
//! - Shallow vs deep copies
//! - Text rendering and parsing

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use clickhouse_core::{DataValue, MultiPolygon, MultiPolygonValue};

fn grid(polygons: usize, points: usize) -> Vec<Vec<Vec<Vec<f64>>>> {
    (0..polygons)
        .map(|p| {
            let ring = (0..points).map(|i| vec![p as f64, i as f64 * 0.5]).collect();
            vec![ring]
        })
        .collect()
}

fn bench_point_updates(c: &mut Criterion) {
    let mut value = MultiPolygonValue::of_empty();
    let point = [12.5, -3.25];

    c.bench_function("update_from_point", |b| {
        b.iter(|| {
            value.update(black_box(&point)).expect("Failed to update");
        });
    });
}

fn bench_nested_updates(c: &mut Criterion) {
    let nested = grid(16, 64);
    let mut value = MultiPolygonValue::of_empty();

    c.bench_function("update_from_nested_16x64", |b| {
        b.iter(|| {
            value.update(black_box(&nested)).expect("Failed to update");
        });
    });
}

fn bench_copies(c: &mut Criterion) {
    let value = MultiPolygonValue::of_nested(&grid(16, 64)).expect("Failed to build value");

    c.bench_function("copy_shallow", |b| b.iter(|| black_box(&value).copy(false)));
    c.bench_function("copy_deep", |b| b.iter(|| black_box(&value).copy(true)));
}

fn bench_text(c: &mut Criterion) {
    let value = MultiPolygonValue::of_nested(&grid(16, 64)).expect("Failed to build value");
    let text = value.as_string();

    c.bench_function("as_string_16x64", |b| b.iter(|| black_box(&value).as_string()));
    c.bench_function("parse_16x64", |b| b.iter(|| black_box(text.as_str()).parse::<MultiPolygon>()));
}

criterion_group!(benches, bench_point_updates, bench_nested_updates, bench_copies, bench_text);
criterion_main!(benches);
