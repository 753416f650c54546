#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for chart rendering and export encoding.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tidyviz::export::{encode, ExportOptions, Figure, Format};
use tidyviz::prelude::*;

fn scatter(points: usize) -> Chart {
    let x: Vec<f64> = (0..points).map(|i| i as f64 * 0.1).collect();
    let y: Vec<f64> = x.iter().map(|v| (v * 0.7).sin() * 10.0 + v).collect();
    let group: Vec<&str> = (0..points).map(|i| if i % 2 == 0 { "even" } else { "odd" }).collect();
    let table = Table::new(vec![
        Column::float("x", &x),
        Column::float("y", &y),
        Column::text("group", &group),
    ])
    .expect("benchmark table should be valid");
    Chart::new(table, Aes::new().x("x").y("y").colour("group"))
        .expect("mapping should be valid")
        .geom(Geom::point())
        .expect("layer should be valid")
        .overlay(Overlay::title("benchmark"))
        .dimensions(800, 600)
}

fn render_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("chart_render");

    for points in [100, 1_000, 10_000] {
        let figure = Figure::from(scatter(points));
        group.bench_with_input(BenchmarkId::new("png", points), &figure, |b, figure| {
            b.iter(|| {
                encode(black_box(figure), Format::Png, &ExportOptions::new())
                    .expect("encoding should succeed")
            });
        });
        group.bench_with_input(BenchmarkId::new("svg", points), &figure, |b, figure| {
            b.iter(|| {
                encode(black_box(figure), Format::Svg, &ExportOptions::new())
                    .expect("encoding should succeed")
            });
        });
    }

    group.finish();
}

fn layout_benchmark(c: &mut Criterion) {
    let layout = (scatter(500) | scatter(500)) / scatter(500);
    let figure = Figure::from(layout);
    c.bench_function("layout_render_png", |b| {
        b.iter(|| {
            encode(black_box(&figure), Format::Png, &ExportOptions::new())
                .expect("encoding should succeed")
        });
    });
}

criterion_group!(benches, render_benchmark, layout_benchmark);
criterion_main!(benches);
