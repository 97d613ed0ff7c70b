//! # sortlast-compose
//!
//! Distributed composition collectives for sort-last rendering.
//!
//! Every rank paints its share of the geometry into a full-resolution
//! local image; the compositors defined here merge those images across
//! the group so that each rank ends up owning a disjoint strip of the
//! final picture, and [`gather`] reassembles the strips on a root rank:
//!
//! - [`Compositor`] - the contract: full-screen image in, strip out,
//!   strips partition the framebuffer
//! - [`BinarySwap`] - the default log2(P)-round pairwise exchange
//! - [`DirectSend`] - all-to-one fold and redistribute; any group size,
//!   and the fallback when P is not a power of two
//! - [`gather`] - strips to root, with partition verification
//!
//! All collectives assume the ordering discipline of
//! `sortlast-comm`: same calls, same order, on every rank. Errors are
//! never retried and no partial results are produced.
//!
//! ## Ordering convention
//!
//! For order-dependent encodings both compositors treat lower ranks as
//! farther from the viewer: rank 0 is the backmost layer. Geometry
//! distribution must respect this or translucent results are wrong.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod binary_swap;
pub mod compositor;
pub mod direct_send;
pub mod error;
pub mod gather;
mod tags;

pub use binary_swap::BinarySwap;
pub use compositor::Compositor;
pub use direct_send::DirectSend;
pub use error::{ComposeError, ComposeResult};
pub use gather::gather;
