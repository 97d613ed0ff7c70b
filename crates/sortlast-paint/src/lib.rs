//! # sortlast-paint
//!
//! Geometry and the software rasterizer for the sort-last miniapp.
//!
//! Composition only needs each rank to produce a full-resolution local
//! image; this crate produces those images:
//!
//! - [`Mesh`] / [`Triangle`] - flat-shaded triangle soup, plus the
//!   synthetic box scene
//! - [`distribute`] / [`Distribution`] - per-rank triangle subsets,
//!   duplicated into a rank grid or partitioned
//! - [`Camera`] - shared view and projection transforms
//! - [`paint`] - barycentric rasterization through the encoding's blend
//!   operator, with back-to-front sorting for order-dependent encodings
//!
//! The back-to-front contract has two halves: within a rank the painter
//! sorts triangles, across ranks the distribution must place lower ranks
//! farther from the camera. [`Distribution::Duplicate`] and
//! [`Camera::frame_box`] uphold the cross-rank half together.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod camera;
pub mod distribute;
pub mod mesh;
pub mod painter;

pub use camera::Camera;
pub use distribute::{Distribution, distribute, scene_bounds};
pub use mesh::{Mesh, Triangle};
pub use painter::paint;
