//! Benchmarks for model stepping and figure rasterization.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use turing_viz::{
    compute::TuringModel,
    render::{Backend, Colormap, FigureSize, Origin, RasterBackend, Surface},
    schema::ModelConfig,
    system::{ChannelId, StateSystem},
};

fn bench_model_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("model_update");

    for size in [32, 64, 128, 256] {
        let config = ModelConfig {
            width: size,
            height: size,
            ..Default::default()
        };

        let mut model = TuringModel::new(config);
        model.initialise().unwrap();

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", size, size)),
            &size,
            |b, _| {
                b.iter(|| {
                    black_box(&mut model).update().unwrap();
                });
            },
        );
    }

    group.finish();
}

fn bench_rasterize(c: &mut Criterion) {
    let mut group = c.benchmark_group("rasterize");

    let mut model = TuringModel::new(ModelConfig::default());
    model.initialise().unwrap();
    let grid = model.channel(ChannelId::TPlus).unwrap().clamp_non_negative();

    for dpi in [60, 100] {
        let mut figure = RasterBackend.new_surface(FigureSize::new(6.0, 6.0));
        figure.draw_heatmap(&grid, Colormap::Jet, Origin::Lower);
        figure.add_colorbar();

        group.bench_with_input(BenchmarkId::from_parameter(dpi), &dpi, |b, &dpi| {
            b.iter(|| black_box(figure.rasterize(dpi)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_model_update, bench_rasterize);
criterion_main!(benches);
