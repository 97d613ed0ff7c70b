//! The direct-send compositor.
//!
//! Direct send is the simple all-to-one algorithm: every rank ships its
//! full local image to a designated owner, the owner folds them together
//! in rank order (rank 0 backmost, matching the ordering convention of
//! [`BinarySwap`](crate::binary_swap::BinarySwap)), splits the result into
//! P contiguous strips of near-equal size, and scatters them back. Every
//! rank thus ends up with a strip, and the strips partition the
//! framebuffer: the same postcondition binary swap establishes, so
//! `gather` works identically behind either compositor.
//!
//! It moves O(P) full images through one rank where binary swap moves
//! O(log P) halves through every rank, but it is defined for any group
//! size, which is why it doubles as the non-power-of-two fallback.

use tracing::debug;

use sortlast_comm::Communicator;
use sortlast_core::{Encoding, Image, Region};

use crate::compositor::{Compositor, require_full_screen};
use crate::error::{ComposeError, ComposeResult};
use crate::tags;

/// All-to-one blend onto an owner rank, then strip redistribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectSend {
    owner: usize,
}

impl DirectSend {
    /// Creates a direct-send compositor owned by rank 0.
    pub fn new() -> Self {
        Self { owner: 0 }
    }

    /// Creates a direct-send compositor owned by `owner`.
    pub fn with_owner(owner: usize) -> Self {
        Self { owner }
    }

    /// The contiguous strip of `[0, total)` assigned to `rank`.
    fn strip(total: usize, size: usize, rank: usize) -> Region {
        Region::new(rank * total / size, (rank + 1) * total / size)
    }
}

impl<E: Encoding> Compositor<E> for DirectSend {
    fn compose<C: Communicator>(&self, local: Image<E>, comm: &C) -> ComposeResult<Image<E>> {
        require_full_screen(&local)?;

        let size = comm.size();
        let rank = comm.rank();
        if self.owner >= size {
            return Err(ComposeError::collective(format!(
                "owner rank {} out of range for group of {size}",
                self.owner
            )));
        }
        if size == 1 {
            return Ok(local);
        }

        let width = local.width();
        let height = local.height();
        let total = local.pixel_count();

        if rank != self.owner {
            comm.send(self.owner, tags::DIRECT_BLEND, &local.to_bytes())?;

            let strip = Self::strip(total, size, rank);
            let incoming = comm.recv(self.owner, tags::DIRECT_SCATTER)?;
            let expected = strip.len() * E::BYTES_PER_PIXEL;
            if incoming.len() != expected {
                return Err(ComposeError::collective(format!(
                    "owner sent {} strip bytes, expected {expected}",
                    incoming.len()
                )));
            }
            return Ok(Image::<E>::from_bytes(&incoming, width, height, strip)?);
        }

        debug!(rank, size, "direct send: folding local images");
        let full = Region::new(0, total);
        let expected = total * E::BYTES_PER_PIXEL;
        let mut composed = Image::<E>::full(width, height);
        for src in 0..size {
            // Ascending rank order puts later ranks in front.
            if src == self.owner {
                composed.blend_from(&local)?;
            } else {
                let incoming = comm.recv(src, tags::DIRECT_BLEND)?;
                if incoming.len() != expected {
                    return Err(ComposeError::collective(format!(
                        "rank {src} sent {} bytes, expected {expected}",
                        incoming.len()
                    )));
                }
                let layer = Image::<E>::from_bytes(&incoming, width, height, full)?;
                composed.blend_from(&layer)?;
            }
        }

        for dst in 0..size {
            if dst == self.owner {
                continue;
            }
            let strip = composed.subset(Self::strip(total, size, dst))?;
            comm.send(dst, tags::DIRECT_SCATTER, &strip.to_bytes())?;
        }
        Ok(composed.subset(Self::strip(total, size, self.owner))?)
    }
}
