//! Extraction benchmarks on a synthetic plateaued image

use criterion::{Criterion, criterion_group, criterion_main};
use shapetree_flst::{Algorithm, ExtractOptions, extract, extract_classical};
use std::hint::black_box;

/// Deterministic raster with plateaus and nested structure.
fn synthetic(w: i32, h: i32) -> Vec<u8> {
    let mut gray = Vec::with_capacity((w * h) as usize);
    for y in 0..h {
        for x in 0..w {
            let dx = (2 * x - w).abs();
            let dy = (2 * y - h).abs();
            let ring = (dx.max(dy) / 8) % 5;
            gray.push((ring * 50) as u8);
        }
    }
    gray
}

fn bench_extract(c: &mut Criterion) {
    let (w, h) = (128, 128);
    let gray = synthetic(w, h);

    c.bench_function("td_pre 128x128", |b| {
        b.iter(|| extract(black_box(&gray), w, h, &ExtractOptions::new()).unwrap())
    });
    c.bench_function("td_post 128x128", |b| {
        let opts = ExtractOptions::new().with_algorithm(Algorithm::TdPost);
        b.iter(|| extract(black_box(&gray), w, h, &opts).unwrap())
    });
    c.bench_function("classical 128x128", |b| {
        b.iter(|| extract_classical(black_box(&gray), w, h, 0, 0).unwrap())
    });
}

criterion_group!(benches, bench_extract);
criterion_main!(benches);
