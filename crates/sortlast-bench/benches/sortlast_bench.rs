//! Benchmarks for blending and composition.
//!
//! Run with: `cargo bench`

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use sortlast_bench::bench_image;
use sortlast_comm::group;
use sortlast_compose::{BinarySwap, Compositor};
use sortlast_core::{Image, RgbaF32, RgbaU8Z, RgbF32Z};

/// Pointwise blend of two full-screen images.
fn bench_blend(c: &mut Criterion) {
    let mut bench = c.benchmark_group("blend");

    for size in [64u32, 256].iter() {
        let pixels = (*size as u64) * (*size as u64);
        bench.throughput(Throughput::Elements(pixels));

        let back8 = bench_image::<RgbaU8Z>(*size, *size, 0);
        let front8 = bench_image::<RgbaU8Z>(*size, *size, 1);
        bench.bench_with_input(BenchmarkId::new("rgba8z", size), &size, |b, _| {
            b.iter(|| {
                let mut out = back8.clone();
                out.blend_from(black_box(&front8)).unwrap();
                out
            })
        });

        let backf = bench_image::<RgbF32Z>(*size, *size, 0);
        let frontf = bench_image::<RgbF32Z>(*size, *size, 1);
        bench.bench_with_input(BenchmarkId::new("rgbf32z", size), &size, |b, _| {
            b.iter(|| {
                let mut out = backf.clone();
                out.blend_from(black_box(&frontf)).unwrap();
                out
            })
        });

        let back_a = bench_image::<RgbaF32>(*size, *size, 0);
        let front_a = bench_image::<RgbaF32>(*size, *size, 1);
        bench.bench_with_input(BenchmarkId::new("rgbaf32", size), &size, |b, _| {
            b.iter(|| {
                let mut out = back_a.clone();
                out.blend_from(black_box(&front_a)).unwrap();
                out
            })
        });
    }

    bench.finish();
}

/// Serialization of a full image to wire bytes and back.
fn bench_serialize(c: &mut Criterion) {
    let mut bench = c.benchmark_group("serialize");

    let image = bench_image::<RgbaU8Z>(256, 256, 0);
    bench.throughput(Throughput::Bytes(image.to_bytes().len() as u64));
    bench.bench_function("rgba8z_round_trip", |b| {
        b.iter(|| {
            let bytes = black_box(&image).to_bytes();
            Image::<RgbaU8Z>::from_bytes(&bytes, 256, 256, image.region()).unwrap()
        })
    });

    bench.finish();
}

/// The whole binary-swap collective over thread ranks.
fn bench_binary_swap(c: &mut Criterion) {
    let mut bench = c.benchmark_group("binary_swap");
    bench.sample_size(20);

    for ranks in [2usize, 4, 8].iter() {
        bench.bench_with_input(BenchmarkId::new("rgba8z_128", ranks), ranks, |b, &ranks| {
            b.iter(|| {
                group::run(ranks, |comm| {
                    let local = bench_image::<RgbaU8Z>(128, 128, comm.rank());
                    BinarySwap::new().compose(local, &comm).unwrap().region()
                })
            })
        });
    }

    bench.finish();
}

criterion_group!(benches, bench_blend, bench_serialize, bench_binary_swap);
criterion_main!(benches);
