//! Shared helpers for the integration tests.

use sortlast_core::{Encoding, Image};

/// Writes a shaded fragment into a local image through the blend
/// operator, the way the painter does.
pub fn splat<E: Encoding>(image: &mut Image<E>, index: usize, color: [f32; 4], depth: f32) {
    image.blend_pixel(index, E::from_fragment(color, depth));
}

/// The serial reference result: all local images folded pixel by pixel in
/// rank order, lower ranks in back.
pub fn serial_reference<E: Encoding>(locals: &[Image<E>]) -> Image<E> {
    assert!(!locals.is_empty());
    let width = locals[0].width();
    let height = locals[0].height();
    let mut reference = Image::<E>::full(width, height);
    for local in locals {
        reference
            .blend_from(local)
            .expect("reference images must share dimensions");
    }
    reference
}

/// A deterministic pseudo-random full-screen local image for `rank`.
///
/// Depth varies per (rank, pixel) so compose results exercise real
/// conflicts; a handful of pixels per rank stay clear.
pub fn scrambled_depth_image<E: Encoding>(width: u32, height: u32, rank: usize) -> Image<E> {
    let mut image = Image::<E>::full(width, height);
    let total = width as usize * height as usize;
    for index in 0..total {
        // Small linear congruential mix; any fixed pattern works as long
        // as ranks disagree about which pixels are near.
        let mix = (index * 31 + rank * 17) % 64;
        if mix % 11 == 0 {
            continue;
        }
        let depth = mix as f32 / 64.0;
        let color = [
            (rank as f32 * 0.25).fract(),
            (index % 7) as f32 / 7.0,
            (mix % 5) as f32 / 5.0,
            1.0,
        ];
        splat(&mut image, index, color, depth);
    }
    image
}
