//! Gather: reassembling composited strips on the root rank.
//!
//! After composition every rank owns a disjoint strip of the framebuffer.
//! Gather ships the strips to a designated root, which splices each at
//! its offset into a fresh full-region image. Strips are disjoint, so
//! arrival order cannot affect the result and the root's image is
//! deterministic to the bit.
//!
//! The collective is only defined when the callers' regions partition
//! `[0, width * height)` exactly; the root verifies this and reports
//! [`ComposeError::NonPartitioningRegions`] on any gap or overlap.

use tracing::debug;

use sortlast_comm::Communicator;
use sortlast_core::{Encoding, Image, Region};

use crate::error::{ComposeError, ComposeResult};
use crate::tags;

/// On-wire strip header: begin and end as native-endian u64.
const HEADER_BYTES: usize = 16;

fn encode_strip<E: Encoding>(image: &Image<E>) -> Vec<u8> {
    let region = image.region();
    let mut payload = Vec::with_capacity(HEADER_BYTES + region.len() * E::BYTES_PER_PIXEL);
    payload.extend_from_slice(&(region.begin as u64).to_ne_bytes());
    payload.extend_from_slice(&(region.end as u64).to_ne_bytes());
    payload.extend_from_slice(&image.to_bytes());
    payload
}

fn decode_header(payload: &[u8], src: usize) -> ComposeResult<Region> {
    if payload.len() < HEADER_BYTES {
        return Err(ComposeError::collective(format!(
            "rank {src} sent a {}-byte strip, too short for the region header",
            payload.len()
        )));
    }
    let mut word = [0u8; 8];
    word.copy_from_slice(&payload[..8]);
    let begin = u64::from_ne_bytes(word) as usize;
    word.copy_from_slice(&payload[8..16]);
    let end = u64::from_ne_bytes(word) as usize;
    if begin > end {
        return Err(ComposeError::non_partitioning(format!(
            "rank {src} claims inverted region [{begin}, {end})"
        )));
    }
    Ok(Region::new(begin, end))
}

/// Collects every rank's strip onto `root`.
///
/// Returns the assembled full-region image on the root and an empty image
/// everywhere else.
///
/// # Errors
///
/// - [`ComposeError::NonPartitioningRegions`] when the contributed
///   regions do not partition the framebuffer exactly.
/// - [`ComposeError::CollectiveFailure`] on transport errors or payload
///   size mismatches.
pub fn gather<E: Encoding, C: Communicator>(
    image: &Image<E>,
    root: usize,
    comm: &C,
) -> ComposeResult<Image<E>> {
    let size = comm.size();
    let rank = comm.rank();
    if root >= size {
        return Err(ComposeError::collective(format!(
            "root rank {root} out of range for group of {size}"
        )));
    }

    let width = image.width();
    let height = image.height();
    let total = image.pixel_count();

    if rank != root {
        comm.send(root, tags::GATHER, &encode_strip(image))?;
        return Ok(Image::empty(width, height));
    }

    debug!(root, size, "gather start");
    let mut assembled = Image::<E>::full(width, height);
    let mut strips: Vec<Region> = Vec::with_capacity(size);

    assembled.copy_from(image)?;
    strips.push(image.region());

    for src in 0..size {
        if src == root {
            continue;
        }
        let payload = comm.recv(src, tags::GATHER)?;
        let region = decode_header(&payload, src)?;
        if region.end > total {
            return Err(ComposeError::non_partitioning(format!(
                "rank {src} claims region {region} beyond the {total}-pixel framebuffer"
            )));
        }
        let body = &payload[HEADER_BYTES..];
        let expected = region.len() * E::BYTES_PER_PIXEL;
        if body.len() != expected {
            return Err(ComposeError::collective(format!(
                "rank {src} sent {} strip bytes for region {region}, expected {expected}",
                body.len()
            )));
        }
        let strip = Image::<E>::from_bytes(body, width, height, region)?;
        assembled.copy_from(&strip)?;
        strips.push(region);
    }

    verify_partition(&strips, total)?;
    debug!(root, "gather done");
    Ok(assembled)
}

/// Checks that the non-empty regions tile `[0, total)` with no gap or
/// overlap.
fn verify_partition(strips: &[Region], total: usize) -> ComposeResult<()> {
    let mut covering: Vec<Region> = strips.iter().copied().filter(|r| !r.is_empty()).collect();
    covering.sort_by_key(|r| r.begin);
    let mut cursor = 0;
    for region in covering {
        if region.begin > cursor {
            return Err(ComposeError::non_partitioning(format!(
                "gap at pixels [{cursor}, {})", region.begin
            )));
        }
        if region.begin < cursor {
            return Err(ComposeError::non_partitioning(format!(
                "overlap at pixels [{}, {cursor})", region.begin
            )));
        }
        cursor = region.end;
    }
    if cursor != total {
        return Err(ComposeError::non_partitioning(format!(
            "gap at pixels [{cursor}, {total})"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sortlast_comm::group;
    use sortlast_core::{DepthRgba8, RgbaU8Z};

    #[test]
    fn test_verify_partition_accepts_exact_tiling() {
        let strips = [Region::new(0, 4), Region::new(4, 8), Region::new(8, 16)];
        assert!(verify_partition(&strips, 16).is_ok());
    }

    #[test]
    fn test_verify_partition_ignores_empty_strips() {
        let strips = [Region::new(0, 16), Region::empty_at(8)];
        assert!(verify_partition(&strips, 16).is_ok());
    }

    #[test]
    fn test_verify_partition_rejects_gap_overlap_and_shortfall() {
        assert!(matches!(
            verify_partition(&[Region::new(0, 4), Region::new(6, 16)], 16),
            Err(ComposeError::NonPartitioningRegions { .. })
        ));
        assert!(matches!(
            verify_partition(&[Region::new(0, 8), Region::new(4, 16)], 16),
            Err(ComposeError::NonPartitioningRegions { .. })
        ));
        assert!(matches!(
            verify_partition(&[Region::new(0, 12)], 16),
            Err(ComposeError::NonPartitioningRegions { .. })
        ));
    }

    #[test]
    fn test_gather_two_strips() {
        let results = group::run(2, |comm| {
            let half = if comm.rank() == 0 {
                Region::new(0, 2)
            } else {
                Region::new(2, 4)
            };
            let mut strip = Image::<RgbaU8Z>::new(2, 2, half).unwrap();
            for i in half.begin..half.end {
                strip.put(
                    i,
                    DepthRgba8 {
                        color: [i as u8, 0, 0, 255],
                        depth: 0.5,
                    },
                );
            }
            gather(&strip, 0, &comm)
        });

        let root_image = results[0].as_ref().unwrap();
        assert_eq!(root_image.region(), Region::new(0, 4));
        for i in 0..4 {
            assert_eq!(root_image.get(i).color, [i as u8, 0, 0, 255]);
        }

        let other = results[1].as_ref().unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn test_gather_rejects_overlapping_claims() {
        let results = group::run(2, |comm| {
            let full = Image::<RgbaU8Z>::full(2, 2);
            gather(&full, 0, &comm)
        });
        assert!(matches!(
            results[0],
            Err(ComposeError::NonPartitioningRegions { .. })
        ));
        // The non-root only sends; it cannot see the violation.
        assert!(results[1].is_ok());
    }
}
