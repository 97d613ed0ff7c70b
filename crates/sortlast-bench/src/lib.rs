//! Benchmark support for the sortlast crates.
//!
//! The benchmarks themselves live in `benches/`; this library only holds
//! the shared scene builders so criterion targets stay small.

use sortlast_core::{Encoding, Image};

/// A full-screen local image with a deterministic depth pattern, distinct
/// per rank.
pub fn bench_image<E: Encoding>(width: u32, height: u32, rank: usize) -> Image<E> {
    let mut image = Image::<E>::full(width, height);
    let total = width as usize * height as usize;
    for index in 0..total {
        let mix = (index * 31 + rank * 17) % 97;
        let depth = mix as f32 / 97.0;
        let color = [
            (index % 13) as f32 / 13.0,
            (mix % 7) as f32 / 7.0,
            rank as f32 / 8.0,
            1.0,
        ];
        image.blend_pixel(index, E::from_fragment(color, depth));
    }
    image
}
