//! Benchmarks for nearest-neighbor regridding.
//!
//! Run with: cargo bench --package grid-processor --bench regrid_benchmarks

use climate_common::{BoundingBox, CurvilinearField};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use grid_processor::{CropWindow, Regridder};
use test_utils::create_temperature_grid;

/// Slightly rotated and sheared grid, like a Lambert conformal patch.
fn curvilinear_field(nx: usize, ny: usize) -> CurvilinearField {
    let mut lon = Vec::with_capacity(nx * ny);
    let mut lat = Vec::with_capacity(nx * ny);
    for j in 0..ny {
        for i in 0..nx {
            let x = i as f64 / nx as f64;
            let y = j as f64 / ny as f64;
            lon.push(-121.0 + 7.0 * x + 0.6 * y);
            lat.push(31.0 + 4.5 * y + 0.8 * x);
        }
    }
    let values = create_temperature_grid(nx, ny);
    CurvilinearField::new("2t", nx, ny, lon, lat, values).unwrap()
}

fn bench_build_regridder(c: &mut Criterion) {
    let mut group = c.benchmark_group("regridder_build");
    group.sample_size(10);

    for &(nx, ny) in &[(100, 80), (400, 300), (800, 600)] {
        let field = curvilinear_field(nx, ny);
        group.throughput(Throughput::Elements((nx * ny) as u64));
        group.bench_with_input(
            BenchmarkId::new("nearest", format!("{}x{}", nx, ny)),
            &field,
            |b, field| b.iter(|| black_box(Regridder::for_field(field).unwrap())),
        );
    }
    group.finish();
}

fn bench_apply_and_crop(c: &mut Criterion) {
    let field = curvilinear_field(800, 600);
    let regridder = Regridder::for_field(&field).unwrap();
    let window = CropWindow::new(BoundingBox::rtma_window());

    c.bench_function("regrid_apply_800x600", |b| {
        b.iter(|| black_box(regridder.regrid(&field).unwrap()))
    });

    let regular = regridder.regrid(&field).unwrap();
    c.bench_function("crop_800x600", |b| {
        b.iter(|| black_box(window.crop(&regular).unwrap()))
    });
}

criterion_group!(benches, bench_build_regridder, bench_apply_and_crop);
criterion_main!(benches);
