//! The binary-swap compositor.
//!
//! Binary swap merges P full-screen local images in log2(P) pairwise
//! exchange rounds. At round k, ranks pair up across a stride of 2^k:
//! partner = rank XOR 2^k. Both partners hold images over the same region;
//! each splits it at the midpoint, keeps one half (the lower rank the
//! lower half), sends the other, and blends the received half into the
//! kept one. Every round halves the pixels a rank touches while doubling
//! the number of local images accounted for, so after the last round each
//! rank owns a fully composited strip of roughly (width * height) / P
//! pixels, and the strips of all ranks partition the framebuffer.
//!
//! # Ordering convention
//!
//! For order-dependent encodings the operand accumulated from the lower
//! rank block is the **back** operand: rank 0 is the backmost layer and
//! rank P-1 the frontmost. The painter must distribute geometry so that
//! back-to-front depth order across ranks follows rank order; the
//! compositors on their own cannot repair a violated convention.
//!
//! # Group sizes
//!
//! The exchange pattern requires P to be a power of two. Other sizes fall
//! back to [`DirectSend`] unless the compositor was built with
//! [`BinarySwap::strict`], in which case they fail with
//! [`ComposeError::UnsupportedGroupSize`] rather than silently composing
//! with a different algorithm.

use tracing::{debug, trace};

use sortlast_comm::Communicator;
use sortlast_core::{Encoding, Image};

use crate::compositor::{Compositor, require_full_screen};
use crate::direct_send::DirectSend;
use crate::error::{ComposeError, ComposeResult};
use crate::tags;

/// The default compositor: log2(P)-round pairwise exchange.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinarySwap {
    strict: bool,
}

impl BinarySwap {
    /// Creates a binary-swap compositor that falls back to direct send
    /// for non-power-of-two group sizes.
    pub fn new() -> Self {
        Self { strict: false }
    }

    /// Creates a binary-swap compositor that refuses non-power-of-two
    /// group sizes instead of falling back.
    pub fn strict() -> Self {
        Self { strict: true }
    }
}

impl<E: Encoding> Compositor<E> for BinarySwap {
    fn compose<C: Communicator>(&self, local: Image<E>, comm: &C) -> ComposeResult<Image<E>> {
        require_full_screen(&local)?;

        let size = comm.size();
        let rank = comm.rank();
        if size == 1 {
            return Ok(local);
        }
        if !size.is_power_of_two() {
            if self.strict {
                return Err(ComposeError::UnsupportedGroupSize { size });
            }
            debug!(size, "group size not a power of two, using direct send");
            return DirectSend::new().compose(local, comm);
        }

        let width = local.width();
        let height = local.height();
        let rounds = size.trailing_zeros();
        debug!(rank, size, rounds, "binary swap start");

        let mut mine = local;
        for round in 0..rounds {
            let stride = 1usize << round;
            let partner = rank ^ stride;

            // Both partners currently hold the same region; the lower
            // rank keeps the lower half.
            let (lower, upper) = mine.split();
            let (keep, outgoing) = if rank & stride == 0 {
                (lower, upper)
            } else {
                (upper, lower)
            };

            let payload = outgoing.to_bytes();
            trace!(
                rank,
                round,
                partner,
                keep = %keep.region(),
                bytes = payload.len(),
                "exchange"
            );
            let incoming = comm.exchange(partner, tags::swap_round(round), &payload)?;

            let expected = keep.region().len() * E::BYTES_PER_PIXEL;
            if incoming.len() != expected {
                return Err(ComposeError::collective(format!(
                    "rank {partner} sent {} bytes in round {round}, expected {expected}",
                    incoming.len()
                )));
            }
            let theirs = Image::<E>::from_bytes(&incoming, width, height, keep.region())?;

            // The half received from the higher rank block goes in front.
            mine = if partner > rank {
                let mut merged = keep;
                merged.blend_from(&theirs)?;
                merged
            } else {
                let mut merged = theirs;
                merged.blend_from(&keep)?;
                merged
            };
        }

        debug!(rank, strip = %mine.region(), "binary swap done");
        Ok(mine)
    }
}
