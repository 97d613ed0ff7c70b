//! Literal end-to-end compositing scenarios.

use sortlast_comm::{Communicator, group};
use sortlast_compose::{BinarySwap, ComposeError, Compositor, gather};
use sortlast_core::{DepthRgbF32, Encoding, Image, Region, RgbF32Z, RgbaU8, RgbaU8Z};

use crate::util::splat;

/// One process, depth encoding: a single red fragment at pixel 5 of a
/// 4x4 frame survives compose and gather untouched; everything else
/// stays background.
#[test]
fn scenario_one_rank_depth() {
    let results = group::run(1, |comm| {
        let mut local = Image::<RgbaU8Z>::full(4, 4);
        splat(&mut local, 5, [1.0, 0.0, 0.0, 1.0], 0.5);
        let strip = BinarySwap::new().compose(local, &comm).unwrap();
        gather(&strip, 0, &comm).unwrap()
    });

    let image = &results[0];
    assert_eq!(image.region(), Region::new(0, 16));
    assert_eq!(image.get(5).color, [255, 0, 0, 255]);
    assert_eq!(image.get(5).depth, 0.5);
    for index in (0..16).filter(|&i| i != 5) {
        assert_eq!(image.get(index), RgbaU8Z::clear(), "pixel {index}");
    }
}

/// Two processes, depth encoding: per-pixel winners are the nearer
/// fragments regardless of which rank painted them.
#[test]
fn scenario_two_ranks_depth() {
    let results = group::run(2, |comm| {
        let mut local = Image::<RgbaU8Z>::full(2, 2);
        if comm.rank() == 0 {
            splat(&mut local, 0, [1.0, 0.0, 0.0, 1.0], 0.3);
            splat(&mut local, 3, [0.0, 1.0, 0.0, 1.0], 0.8);
        } else {
            splat(&mut local, 0, [0.0, 0.0, 1.0, 1.0], 0.7);
            splat(&mut local, 3, [0.0, 1.0, 0.0, 1.0], 0.2);
        }
        let strip = BinarySwap::new().compose(local, &comm).unwrap();
        gather(&strip, 0, &comm).unwrap()
    });

    let image = &results[0];
    assert_eq!(image.get(0).color, [255, 0, 0, 255]);
    assert_eq!(image.get(0).depth, 0.3);
    assert_eq!(image.get(3).color, [0, 255, 0, 255]);
    assert_eq!(image.get(3).depth, 0.2);
    assert_eq!(image.get(1), RgbaU8Z::clear());
    assert_eq!(image.get(2), RgbaU8Z::clear());
}

/// Two processes, alpha-over: rank 1 (front) lays half-transparent blue
/// over rank 0's half-transparent red. Premultiplied 8-bit arithmetic
/// gives exactly (64, 0, 128, 192).
#[test]
fn scenario_two_ranks_alpha_over() {
    let results = group::run(2, |comm| {
        let mut local = Image::<RgbaU8>::full(2, 1);
        if comm.rank() == 0 {
            splat(&mut local, 0, [1.0, 0.0, 0.0, 128.0 / 255.0], 0.0);
        } else {
            splat(&mut local, 0, [0.0, 0.0, 1.0, 128.0 / 255.0], 0.0);
        }
        let strip = BinarySwap::new().compose(local, &comm).unwrap();
        gather(&strip, 0, &comm).unwrap()
    });

    let image = &results[0];
    assert_eq!(image.get(0), [64, 0, 128, 192]);
    assert_eq!(image.get(1), RgbaU8::clear());
}

/// Four processes, depth, full screen: each rank paints one quadrant of
/// an 8x8 frame; after compose every rank holds a 16-pixel strip and the
/// gathered image has all four quadrants in place.
#[test]
fn scenario_four_ranks_quadrants() {
    const COLORS: [[f32; 3]; 4] = [
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 0.0],
    ];

    fn quadrant_of(index: usize) -> usize {
        let (row, col) = (index / 8, index % 8);
        (row / 4) * 2 + col / 4
    }

    let results = group::run(4, |comm| {
        let mut local = Image::<RgbF32Z>::full(8, 8);
        let rank = comm.rank();
        for index in 0..64 {
            if quadrant_of(index) == rank {
                let c = COLORS[rank];
                splat(&mut local, index, [c[0], c[1], c[2], 1.0], 0.5);
            }
        }
        let strip = BinarySwap::new().compose(local, &comm).unwrap();
        let gathered = gather(&strip, 0, &comm).unwrap();
        (strip.region(), gathered)
    });

    for (rank, (strip_region, _)) in results.iter().enumerate() {
        assert_eq!(strip_region.len(), 16, "rank {rank} strip size");
    }

    let image = &results[0].1;
    assert_eq!(image.region(), Region::new(0, 64));
    for index in 0..64 {
        let c = COLORS[quadrant_of(index)];
        let expected = DepthRgbF32 {
            color: c,
            depth: 0.5,
        };
        assert_eq!(image.get(index), expected, "pixel {index}");
    }
}

/// Determinism: the quadrant scenario twice over, byte-compared.
#[test]
fn scenario_rerun_is_bit_identical() {
    fn run_once() -> Vec<u8> {
        let results = group::run(4, |comm| {
            let mut local = Image::<RgbF32Z>::full(8, 8);
            let rank = comm.rank();
            for index in 0..64 {
                let (row, col) = (index / 8, index % 8);
                if (row / 4) * 2 + col / 4 == rank {
                    splat(
                        &mut local,
                        index,
                        [rank as f32 / 4.0, 0.5, 1.0 - rank as f32 / 4.0, 1.0],
                        0.5,
                    );
                }
            }
            let strip = BinarySwap::new().compose(local, &comm).unwrap();
            gather(&strip, 0, &comm).unwrap()
        });
        results[0].to_bytes()
    }

    assert_eq!(run_once(), run_once());
}

/// Gather precondition: two ranks both claiming the whole framebuffer is
/// an overlap, reported on the root as non-partitioning regions.
#[test]
fn scenario_gather_rejects_double_claim() {
    let results = group::run(2, |comm| {
        let full = Image::<RgbaU8Z>::full(2, 2);
        gather(&full, 0, &comm)
    });

    assert!(matches!(
        results[0],
        Err(ComposeError::NonPartitioningRegions { .. })
    ));
    let non_root = results[1].as_ref().unwrap();
    assert!(non_root.is_empty());
}
