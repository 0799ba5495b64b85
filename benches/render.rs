// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use num::Complex;

use fractile::recurrence::Kernel;
use fractile::{scalar, simd};
use fractile::{Formula, PaletteSet, Raster, Renderer, ViewportConfig};

fn scene(formula: Formula) -> ViewportConfig {
    ViewportConfig {
        center: Complex::new(-0.5, 0.0),
        view_width: 3.5,
        max_iter: 256,
        formula,
        ..ViewportConfig::default()
    }
}

fn bench_kernels(c: &mut Criterion) {
    let kernel = Kernel::from_config(&scene(Formula::Quadratic));
    let row = [
        Complex::new(-0.75, 0.1),
        Complex::new(-0.74, 0.1),
        Complex::new(-0.73, 0.1),
        Complex::new(-0.72, 0.1),
    ];

    c.bench_function("scalar quadratic x4", move |b| {
        b.iter(|| {
            for point in row.iter() {
                black_box(scalar::escape(&kernel, *point));
            }
        })
    });
    c.bench_function("vector quadratic x4", move |b| {
        b.iter(|| black_box(simd::escape4(&kernel, &row)))
    });
}

fn bench_render(c: &mut Criterion) {
    for &(name, formula) in &[
        ("render mandelbrot 320x240", Formula::Quadratic),
        ("render burning ship 320x240", Formula::BURNING_SHIP),
        ("render multibrot 3.5 320x240", Formula::RealPower { exponent: 3.5 }),
    ] {
        let config = scene(formula);
        c.bench_function(name, move |b| {
            let mut renderer = match Renderer::with_threads(PaletteSet::standard(), 0) {
                Ok(renderer) => renderer,
                Err(e) => panic!("could not start renderer: {}", e),
            };
            let mut raster = Raster::new(320, 240);
            b.iter(|| renderer.render(&config, &mut raster))
        });
    }
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = bench_kernels, bench_render
}
criterion_main!(benches);
