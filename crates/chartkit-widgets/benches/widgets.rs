//! Benchmarks for full chart draws and pointer queries.

use chartkit_core::ChartOptions;
use chartkit_widgets::{Chart, Donut, DonutData, HeadlessHost, Heatmap, HeatmapCell, HeatmapData, Slice};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn static_options() -> ChartOptions {
    ChartOptions::default()
        .merge(&serde_json::json!({"animate": false}))
        .unwrap_or_default()
}

fn heatmap_cells(n: usize, groups: usize) -> HeatmapData {
    HeatmapData {
        cells: (0..n)
            .map(|i| HeatmapCell {
                label: format!("T{i}"),
                weight: ((i * 37) % 500 + 1) as f64,
                change: ((i * 13) % 11) as f64 - 5.0,
                group: (groups > 0).then(|| format!("G{}", i % groups)),
            })
            .collect(),
    }
}

fn bench_heatmap_redraw(c: &mut Criterion) {
    let mut flat = Chart::<Heatmap, _>::create(HeadlessHost::new(1200.0, 800.0, 2.0), static_options());
    flat.set_data(heatmap_cells(500, 0));
    c.bench_function("heatmap_redraw_500", |b| b.iter(|| {
            flat.redraw();
            flat.host_mut().take_commands()
        }));

    let mut grouped =
        Chart::<Heatmap, _>::create(HeadlessHost::new(1200.0, 800.0, 2.0), static_options());
    grouped.set_data(heatmap_cells(500, 11));
    c.bench_function("heatmap_redraw_500_grouped", |b| b.iter(|| {
            grouped.redraw();
            grouped.host_mut().take_commands()
        }));
}

fn bench_pointer_move(c: &mut Criterion) {
    let mut heatmap =
        Chart::<Heatmap, _>::create(HeadlessHost::new(1200.0, 800.0, 2.0), static_options());
    heatmap.set_data(heatmap_cells(500, 0));
    c.bench_function("heatmap_hit_test_500", |b| {
        b.iter(|| heatmap.hit_test(black_box(611.0), black_box(403.0)))
    });

    let mut donut = Chart::<Donut, _>::create(HeadlessHost::new(400.0, 400.0, 1.0), static_options());
    donut.set_data(DonutData {
        slices: (0..24)
            .map(|i| Slice {
                label: format!("S{i}"),
                value: f64::from(i + 1),
            })
            .collect(),
    });
    c.bench_function("donut_hit_test_24", |b| {
        b.iter(|| donut.hit_test(black_box(320.0), black_box(140.0)))
    });
}

criterion_group!(benches, bench_heatmap_redraw, bench_pointer_move);
criterion_main!(benches);
