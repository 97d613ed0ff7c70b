//! The contract every composition algorithm satisfies.

use sortlast_comm::Communicator;
use sortlast_core::{Encoding, Image};

use crate::error::ComposeResult;

/// A distributed composition algorithm.
///
/// `compose` is a collective: every rank of the group must call it the
/// same number of times in the same order, each passing its own local
/// image. Input is the rank's full-screen paint result (region
/// `[0, width * height)`); output is the rank's share of the final pixels,
/// and the output regions of all ranks partition the framebuffer exactly.
///
/// The local image is consumed; intermediate sub-images are created and
/// released as the algorithm proceeds and no aliases of the input survive
/// the call.
pub trait Compositor<E: Encoding> {
    /// Composites `local` against every other rank's local image and
    /// returns this rank's strip of the result.
    fn compose<C: Communicator>(&self, local: Image<E>, comm: &C) -> ComposeResult<Image<E>>;
}

/// Rejects local images that do not cover the whole framebuffer.
pub(crate) fn require_full_screen<E: Encoding>(local: &Image<E>) -> ComposeResult<()> {
    let full = sortlast_core::Region::new(0, local.pixel_count());
    if local.region() != full {
        return Err(sortlast_core::Error::invalid_region(
            local.region(),
            local.width(),
            local.height(),
        )
        .into());
    }
    Ok(())
}
