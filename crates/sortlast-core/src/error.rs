//! Error types for core image operations.

use crate::region::Region;
use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during local image operations.
///
/// Collective failures (transport errors, partition violations) live in the
/// composition layer; this enum covers only conditions a single process can
/// detect on its own data.
#[derive(Debug, Error)]
pub enum Error {
    /// Region bounds violate `0 <= begin <= end <= width * height`.
    #[error("region {region} invalid for a {width}x{height} framebuffer")]
    InvalidRegion {
        /// The offending region.
        region: Region,
        /// Framebuffer width.
        width: u32,
        /// Framebuffer height.
        height: u32,
    },

    /// Operands differ in framebuffer dimensions.
    ///
    /// Encodings cannot differ at runtime; that mismatch is ruled out by the
    /// type parameter on [`Image`](crate::image::Image).
    #[error("incompatible images: {a_width}x{a_height} vs {b_width}x{b_height}")]
    IncompatibleImages {
        /// First image width.
        a_width: u32,
        /// First image height.
        a_height: u32,
        /// Second image width.
        b_width: u32,
        /// Second image height.
        b_height: u32,
    },

    /// A serialized pixel payload has the wrong byte length for its region.
    #[error("payload size mismatch: expected {expected} bytes, got {got}")]
    SizeMismatch {
        /// Byte length implied by the region and encoding.
        expected: usize,
        /// Byte length actually provided.
        got: usize,
    },
}

impl Error {
    /// Creates an [`Error::InvalidRegion`] error.
    #[inline]
    pub fn invalid_region(region: Region, width: u32, height: u32) -> Self {
        Self::InvalidRegion {
            region,
            width,
            height,
        }
    }

    /// Creates an [`Error::IncompatibleImages`] error.
    #[inline]
    pub fn incompatible(a: (u32, u32), b: (u32, u32)) -> Self {
        Self::IncompatibleImages {
            a_width: a.0,
            a_height: a.1,
            b_width: b.0,
            b_height: b.1,
        }
    }

    /// Creates an [`Error::SizeMismatch`] error.
    #[inline]
    pub fn size_mismatch(expected: usize, got: usize) -> Self {
        Self::SizeMismatch { expected, got }
    }
}
