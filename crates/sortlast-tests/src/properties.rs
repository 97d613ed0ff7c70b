//! Universal properties of the composition pipeline.

use sortlast_comm::{Communicator, group};
use sortlast_compose::{BinarySwap, ComposeError, Compositor, DirectSend, gather};
use sortlast_core::{Encoding, Image, Region, RgbF32Z, RgbaF32, RgbaU8, RgbaU8Z};

use crate::util::{scrambled_depth_image, serial_reference, splat};

/// Composes with binary swap on `ranks` threads and returns every rank's
/// strip plus the gathered root image.
fn compose_and_gather<E, F>(ranks: usize, make_local: F) -> (Vec<Region>, Image<E>)
where
    E: Encoding,
    F: Fn(usize) -> Image<E> + Send + Sync,
{
    let results = group::run(ranks, |comm| {
        let local = make_local(comm.rank());
        let strip = BinarySwap::new().compose(local, &comm).unwrap();
        let region = strip.region();
        (region, gather(&strip, 0, &comm).unwrap())
    });
    let regions = results.iter().map(|(region, _)| *region).collect();
    let root = results.into_iter().next().map(|(_, image)| image);
    (regions, root.expect("group is non-empty"))
}

/// After compose the strips partition the framebuffer: no gap, no
/// overlap, full coverage.
#[test]
fn property_partition_after_compose() {
    for ranks in [2usize, 4, 8, 16] {
        let (mut regions, _) =
            compose_and_gather::<RgbaU8Z, _>(ranks, |rank| scrambled_depth_image(8, 8, rank));
        regions.sort_by_key(|r| r.begin);
        let mut cursor = 0;
        for region in regions {
            assert_eq!(region.begin, cursor, "ranks={ranks}");
            cursor = region.end;
        }
        assert_eq!(cursor, 64, "ranks={ranks}");
    }
}

/// Depth composition equals the serial fold of all local images, for
/// every power-of-two group size.
#[test]
fn property_depth_compose_matches_serial_reference() {
    for ranks in [1usize, 2, 4, 8, 16] {
        let locals: Vec<Image<RgbaU8Z>> = (0..ranks)
            .map(|rank| scrambled_depth_image(8, 8, rank))
            .collect();
        let expected = serial_reference(&locals);

        let (_, gathered) =
            compose_and_gather::<RgbaU8Z, _>(ranks, |rank| locals[rank].clone());
        assert_eq!(gathered.to_bytes(), expected.to_bytes(), "ranks={ranks}");
    }
}

/// Depth composition is insensitive to which rank holds which image.
#[test]
fn property_depth_compose_is_rank_order_independent() {
    let locals: Vec<Image<RgbF32Z>> = (0..4)
        .map(|rank| scrambled_depth_image(4, 4, rank))
        .collect();

    let (_, forward) = compose_and_gather::<RgbF32Z, _>(4, |rank| locals[rank].clone());
    let (_, reversed) = compose_and_gather::<RgbF32Z, _>(4, |rank| locals[3 - rank].clone());
    assert_eq!(forward.to_bytes(), reversed.to_bytes());
}

/// Alpha-over composition equals the left-to-right fold in rank order.
///
/// Layer values are dyadic rationals, so the float arithmetic is exact
/// and the equality is bitwise.
#[test]
fn property_alpha_compose_is_the_rank_order_fold() {
    for ranks in [2usize, 4, 8] {
        let make_local = |rank: usize| {
            let mut local = Image::<RgbaF32>::full(4, 2);
            for index in 0..8 {
                // Every rank covers every pixel with a distinct
                // half-transparent color.
                let color = [
                    if rank % 2 == 0 { 1.0 } else { 0.25 },
                    (rank % 4) as f32 * 0.25,
                    if index % 2 == 0 { 0.5 } else { 1.0 },
                    0.5,
                ];
                splat(&mut local, index, color, 0.0);
            }
            local
        };

        let locals: Vec<Image<RgbaF32>> = (0..ranks).map(make_local).collect();
        let expected = serial_reference(&locals);

        let (_, gathered) = compose_and_gather::<RgbaF32, _>(ranks, make_local);
        assert_eq!(gathered.to_bytes(), expected.to_bytes(), "ranks={ranks}");
    }
}

/// With arbitrary (non-dyadic) alphas the pairwise merge tree and the
/// serial fold may round differently, but only at float precision.
#[test]
fn property_alpha_compose_matches_fold_within_tolerance() {
    use approx::assert_relative_eq;

    let make_local = |rank: usize| {
        let mut local = Image::<RgbaF32>::full(4, 2);
        for index in 0..8 {
            let color = [
                0.9 - 0.1 * rank as f32,
                0.1 + 0.07 * index as f32,
                0.3,
                0.3 + 0.1 * rank as f32,
            ];
            splat(&mut local, index, color, 0.0);
        }
        local
    };

    let locals: Vec<Image<RgbaF32>> = (0..4).map(make_local).collect();
    let expected = serial_reference(&locals);

    let (_, gathered) = compose_and_gather::<RgbaF32, _>(4, make_local);
    for index in 0..8 {
        let got = gathered.get(index);
        let want = expected.get(index);
        for channel in 0..4 {
            assert_relative_eq!(got[channel], want[channel], epsilon = 1e-5);
        }
    }
}

/// The 8-bit alpha encoding survives the pipeline too; with two ranks the
/// pairwise result is exact by construction.
#[test]
fn property_alpha_u8_two_rank_fold() {
    let locals: Vec<Image<RgbaU8>> = (0..2)
        .map(|rank| {
            let mut local = Image::<RgbaU8>::full(2, 2);
            for index in 0..4 {
                let color = if rank == 0 {
                    [1.0, 0.0, 0.0, 0.5]
                } else {
                    [0.0, 1.0, 0.0, 0.25]
                };
                splat(&mut local, index, color, 0.0);
            }
            local
        })
        .collect();
    let expected = serial_reference(&locals);

    let (_, gathered) = compose_and_gather::<RgbaU8, _>(2, |rank| locals[rank].clone());
    assert_eq!(gathered.to_bytes(), expected.to_bytes());
}

/// Full-image serialization round-trip through the wire format.
#[test]
fn property_serialization_round_trip() {
    let image = scrambled_depth_image::<RgbF32Z>(8, 4, 3);
    let bytes = image.to_bytes();
    let back = Image::<RgbF32Z>::from_bytes(&bytes, 8, 4, image.region()).unwrap();
    assert_eq!(back, image);
}

/// Binary swap's fallback and direct send agree with the serial
/// reference on a non-power-of-two group.
#[test]
fn property_non_power_of_two_falls_back_correctly() {
    let locals: Vec<Image<RgbaU8Z>> = (0..6)
        .map(|rank| scrambled_depth_image(4, 4, rank))
        .collect();
    let expected = serial_reference(&locals);

    let results = group::run(6, |comm| {
        let local = locals[comm.rank()].clone();
        let strip = BinarySwap::new().compose(local, &comm).unwrap();
        gather(&strip, 0, &comm).unwrap()
    });
    assert_eq!(results[0].to_bytes(), expected.to_bytes());

    let direct = group::run(6, |comm| {
        let local = locals[comm.rank()].clone();
        let strip = DirectSend::new().compose(local, &comm).unwrap();
        gather(&strip, 0, &comm).unwrap()
    });
    assert_eq!(direct[0].to_bytes(), expected.to_bytes());
}

/// Strict binary swap refuses a non-power-of-two group on every rank.
#[test]
fn property_strict_mode_rejects_unsupported_group_size() {
    let results = group::run(5, |comm| {
        let local = Image::<RgbaU8Z>::full(2, 2);
        BinarySwap::strict().compose(local, &comm)
    });
    for outcome in results {
        assert!(matches!(
            outcome,
            Err(ComposeError::UnsupportedGroupSize { size: 5 })
        ));
    }
}

/// A framebuffer smaller than the group still composes: some strips come
/// out empty and the partition still holds.
#[test]
fn property_tiny_framebuffer_large_group() {
    let (regions, gathered) =
        compose_and_gather::<RgbaU8Z, _>(8, |rank| scrambled_depth_image(2, 2, rank));
    let covered: usize = regions.iter().map(|r| r.len()).sum();
    assert_eq!(covered, 4);
    assert_eq!(gathered.region(), Region::new(0, 4));
}
