//! Binary PPM (P6) image dump.
//!
//! The root rank's gathered image goes to disk as an 8-bit RGB PPM, rows
//! top to bottom. Color-only encodings store premultiplied color, so what
//! lands in the file is the image composited against black.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use sortlast_core::{Encoding, Image};

/// Writes `image` to `path` as binary PPM.
///
/// # Panics
///
/// Panics in debug builds if `image` does not cover the full framebuffer.
pub fn write_ppm<E: Encoding>(path: &Path, image: &Image<E>) -> io::Result<()> {
    debug_assert_eq!(
        image.region().len(),
        image.pixel_count(),
        "PPM dump needs the full gathered image"
    );
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    write!(out, "P6\n{} {}\n255\n", image.width(), image.height())?;
    for index in 0..image.pixel_count() {
        let rgba = E::display(image.get(index));
        out.write_all(&rgba[..3])?;
    }
    out.flush()
}
