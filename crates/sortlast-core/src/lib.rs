//! # sortlast-core
//!
//! Core types for sort-last parallel image compositing.
//!
//! In a sort-last renderer every rank rasterizes its share of the geometry
//! into a private full-resolution framebuffer, and the framebuffers are
//! merged afterwards, pixel by pixel, respecting depth or alpha ordering.
//! This crate holds the pieces that merging is built from:
//!
//! - [`Encoding`] and the four concrete encodings ([`RgbaU8Z`],
//!   [`RgbF32Z`], [`RgbaU8`], [`RgbaF32`]) - per-pixel storage, clear
//!   value, blend operator, byte-exact serialization
//! - [`Region`] - the half-open pixel-index range an image stores
//! - [`Image`] - the region-backed framebuffer with split, subset, blend,
//!   and serialize operations
//! - [`Error`] - failures a single rank can detect locally
//!
//! The communication layer lives in `sortlast-comm` and the composition
//! algorithms in `sortlast-compose`; both build exclusively on the types
//! here.
//!
//! ## Design
//!
//! Encodings are a closed set of zero-sized markers behind one trait, so
//! all compositor code is monomorphized and pixel semantics are fixed at
//! compile time. Images move by value: splitting consumes the source, the
//! sent half leaves as an owned byte buffer, and no shared mutable aliases
//! survive an exchange round.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod encoding;
pub mod error;
pub mod image;
pub mod region;

pub use encoding::{
    DepthRgba8, DepthRgbF32, Encoding, EncodingKind, RgbaF32, RgbaU8, RgbaU8Z, RgbF32Z,
};
pub use error::{Error, Result};
pub use image::Image;
pub use region::Region;
