//! The region-backed framebuffer.
//!
//! An [`Image`] is a full framebuffer's worth of logical pixels of which
//! only a contiguous [`Region`] is actually stored; everything outside the
//! region is the encoding's clear value. The painter produces full-region
//! images, the compositors split them, trade halves between ranks, and
//! blend the pieces back together, so images move **by value**: a split
//! consumes its input and yields two independently owned halves, and a
//! serialized half travels as its own byte buffer. No shared mutable
//! aliases survive an exchange round.
//!
//! # Example
//!
//! ```rust
//! use sortlast_core::{Image, Region, RgbaU8Z, Encoding};
//!
//! let mut local = Image::<RgbaU8Z>::full(4, 4);
//! local.blend_pixel(5, RgbaU8Z::from_fragment([1.0, 0.0, 0.0, 1.0], 0.5));
//!
//! let (lower, upper) = local.split();
//! assert_eq!(lower.region(), Region::new(0, 8));
//! assert_eq!(upper.region(), Region::new(8, 16));
//! ```

use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::region::Region;

/// A rectangular framebuffer storing one contiguous region of pixels.
///
/// All ranks in a run agree on `width`, `height`, and the encoding `E`;
/// the region is what varies as composition proceeds.
#[derive(Clone, PartialEq)]
pub struct Image<E: Encoding> {
    width: u32,
    height: u32,
    region: Region,
    pixels: Vec<E::Pixel>,
}

impl<E: Encoding> Image<E> {
    /// Creates an image storing `region`, initialized to clear.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] unless
    /// `0 <= region.begin <= region.end <= width * height`.
    pub fn new(width: u32, height: u32, region: Region) -> Result<Self> {
        let total = width as usize * height as usize;
        if region.begin > region.end || region.end > total {
            return Err(Error::invalid_region(region, width, height));
        }
        Ok(Self {
            width,
            height,
            region,
            pixels: vec![E::clear(); region.len()],
        })
    }

    /// Creates a cleared image covering the whole framebuffer.
    pub fn full(width: u32, height: u32) -> Self {
        let total = width as usize * height as usize;
        Self {
            width,
            height,
            region: Region::new(0, total),
            pixels: vec![E::clear(); total],
        }
    }

    /// Creates an image storing nothing, as returned to non-root ranks by
    /// a gather.
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            region: Region::empty_at(0),
            pixels: Vec::new(),
        }
    }

    /// Framebuffer width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Framebuffer height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of logical pixels, `width * height`.
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// The stored region.
    #[inline]
    pub fn region(&self) -> Region {
        self.region
    }

    /// Returns `true` if the stored region is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.region.is_empty()
    }

    /// The stored pixels, ordered by pixel index within the region.
    #[inline]
    pub fn as_slice(&self) -> &[E::Pixel] {
        &self.pixels
    }

    /// Row and column of pixel index `i` (row-major).
    #[inline]
    pub fn position(&self, index: usize) -> (u32, u32) {
        let w = self.width as usize;
        ((index / w) as u32, (index % w) as u32)
    }

    /// The logical pixel at `index`: the stored value inside the region,
    /// the clear value elsewhere.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index >= width * height`.
    #[inline]
    pub fn get(&self, index: usize) -> E::Pixel {
        debug_assert!(index < self.pixel_count(), "pixel index out of bounds");
        if self.region.contains(index) {
            self.pixels[index - self.region.begin]
        } else {
            E::clear()
        }
    }

    /// Stores `pixel` at `index`, replacing the previous value.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index` is outside the stored region.
    #[inline]
    pub fn put(&mut self, index: usize, pixel: E::Pixel) {
        debug_assert!(self.region.contains(index), "pixel index outside region");
        let offset = index - self.region.begin;
        self.pixels[offset] = pixel;
    }

    /// Contributes a fragment at `index` through the blend operator, with
    /// the fragment in front. This is how the painter writes.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index` is outside the stored region.
    #[inline]
    pub fn blend_pixel(&mut self, index: usize, front: E::Pixel) {
        debug_assert!(self.region.contains(index), "pixel index outside region");
        let offset = index - self.region.begin;
        self.pixels[offset] = E::blend(front, self.pixels[offset]);
    }

    /// Resets every stored pixel to the clear value.
    pub fn clear(&mut self) {
        self.pixels.fill(E::clear());
    }

    /// Pointwise blend with `front` over the intersection of the two
    /// regions; pixels outside the intersection are unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::IncompatibleImages`] if framebuffer dimensions differ.
    pub fn blend_from(&mut self, front: &Image<E>) -> Result<()> {
        if (self.width, self.height) != (front.width, front.height) {
            return Err(Error::incompatible(
                (self.width, self.height),
                (front.width, front.height),
            ));
        }
        if let Some(overlap) = self.region.intersect(&front.region) {
            for index in overlap.begin..overlap.end {
                let offset = index - self.region.begin;
                let top = front.pixels[index - front.region.begin];
                self.pixels[offset] = E::blend(top, self.pixels[offset]);
            }
        }
        Ok(())
    }

    /// Copies `part`'s stored pixels into place over the intersection of
    /// the two regions; pixels outside the intersection are unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::IncompatibleImages`] if framebuffer dimensions differ.
    pub fn copy_from(&mut self, part: &Image<E>) -> Result<()> {
        if (self.width, self.height) != (part.width, part.height) {
            return Err(Error::incompatible(
                (self.width, self.height),
                (part.width, part.height),
            ));
        }
        if let Some(overlap) = self.region.intersect(&part.region) {
            for index in overlap.begin..overlap.end {
                self.pixels[index - self.region.begin] = part.pixels[index - part.region.begin];
            }
        }
        Ok(())
    }

    /// An owned copy of `region` intersected with the stored region.
    ///
    /// When the two are disjoint the result is an empty image.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] if `region` itself is out of framebuffer
    /// bounds.
    pub fn subset(&self, region: Region) -> Result<Image<E>> {
        if region.begin > region.end || region.end > self.pixel_count() {
            return Err(Error::invalid_region(region, self.width, self.height));
        }
        let covered = match self.region.intersect(&region) {
            Some(overlap) => overlap,
            None => Region::empty_at(region.begin.clamp(self.region.begin, self.region.end)),
        };
        let lo = covered.begin - self.region.begin;
        let hi = covered.end - self.region.begin;
        Ok(Image {
            width: self.width,
            height: self.height,
            region: covered,
            pixels: self.pixels[lo..hi].to_vec(),
        })
    }

    /// Consumes the image and splits it at the region midpoint into
    /// independently owned (lower, upper) halves.
    pub fn split(mut self) -> (Image<E>, Image<E>) {
        let (lower, upper) = self.region.split();
        let upper_pixels = self.pixels.split_off(lower.len());
        let upper_image = Image {
            width: self.width,
            height: self.height,
            region: upper,
            pixels: upper_pixels,
        };
        self.region = lower;
        (self, upper_image)
    }

    /// Serializes the stored pixels in host byte order.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = vec![0u8; self.pixels.len() * E::BYTES_PER_PIXEL];
        E::encode(&self.pixels, &mut bytes);
        bytes
    }

    /// Deserializes an image from `bytes`; exact inverse of
    /// [`to_bytes`](Self::to_bytes) for the same `width`/`height`/`region`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRegion`] for out-of-bounds regions and
    /// [`Error::SizeMismatch`] when the byte length does not equal
    /// `region.len() * BYTES_PER_PIXEL`.
    pub fn from_bytes(bytes: &[u8], width: u32, height: u32, region: Region) -> Result<Image<E>> {
        let mut image = Image::new(width, height, region)?;
        let expected = region.len() * E::BYTES_PER_PIXEL;
        if bytes.len() != expected {
            return Err(Error::size_mismatch(expected, bytes.len()));
        }
        E::decode(bytes, &mut image.pixels);
        Ok(image)
    }
}

impl<E: Encoding> std::fmt::Debug for Image<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("region", &self.region)
            .field("encoding", &E::NAME)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::{DepthRgba8, RgbaF32, RgbaU8Z};

    #[test]
    fn test_new_validates_region() {
        assert!(Image::<RgbaU8Z>::new(4, 4, Region::new(0, 16)).is_ok());
        assert!(Image::<RgbaU8Z>::new(4, 4, Region::new(8, 12)).is_ok());
        assert!(matches!(
            Image::<RgbaU8Z>::new(4, 4, Region::new(0, 17)),
            Err(Error::InvalidRegion { .. })
        ));
        assert!(matches!(
            Image::<RgbaU8Z>::new(4, 4, Region { begin: 9, end: 8 }),
            Err(Error::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_full_starts_clear() {
        let img = Image::<RgbaU8Z>::full(2, 2);
        assert_eq!(img.region(), Region::new(0, 4));
        for i in 0..4 {
            assert_eq!(img.get(i), RgbaU8Z::clear());
        }
    }

    #[test]
    fn test_get_outside_region_is_clear() {
        let img = Image::<RgbaU8Z>::new(4, 4, Region::new(4, 8)).unwrap();
        assert_eq!(img.get(0), RgbaU8Z::clear());
        assert_eq!(img.get(15), RgbaU8Z::clear());
    }

    #[test]
    fn test_put_and_get() {
        let mut img = Image::<RgbaU8Z>::full(4, 4);
        let p = DepthRgba8 {
            color: [255, 0, 0, 255],
            depth: 0.5,
        };
        img.put(5, p);
        assert_eq!(img.get(5), p);
        assert_eq!(img.position(5), (1, 1));
    }

    #[test]
    fn test_blend_pixel_depth_test() {
        let mut img = Image::<RgbaU8Z>::full(2, 1);
        let far = DepthRgba8 {
            color: [0, 0, 255, 255],
            depth: 0.9,
        };
        let near = DepthRgba8 {
            color: [255, 0, 0, 255],
            depth: 0.1,
        };
        img.blend_pixel(0, far);
        img.blend_pixel(0, near);
        img.blend_pixel(1, near);
        img.blend_pixel(1, far);
        assert_eq!(img.get(0), near);
        assert_eq!(img.get(1), near);
    }

    #[test]
    fn test_blend_from_intersection_only() {
        let mut a = Image::<RgbaU8Z>::new(4, 1, Region::new(0, 3)).unwrap();
        let mut b = Image::<RgbaU8Z>::new(4, 1, Region::new(2, 4)).unwrap();
        let p = DepthRgba8 {
            color: [9, 9, 9, 255],
            depth: 0.5,
        };
        b.put(2, p);
        b.put(3, p);
        a.blend_from(&b).unwrap();

        // Index 2 is in the intersection, index 3 is outside `a`.
        assert_eq!(a.get(2), p);
        assert_eq!(a.get(3), RgbaU8Z::clear());
        assert_eq!(a.region(), Region::new(0, 3));
    }

    #[test]
    fn test_blend_from_rejects_mismatched_dimensions() {
        let mut a = Image::<RgbaU8Z>::full(4, 4);
        let b = Image::<RgbaU8Z>::full(2, 2);
        assert!(matches!(
            a.blend_from(&b),
            Err(Error::IncompatibleImages { .. })
        ));
    }

    #[test]
    fn test_subset() {
        let mut img = Image::<RgbaF32>::full(4, 1);
        img.put(1, [0.5, 0.0, 0.0, 0.5]);
        img.put(2, [0.0, 0.5, 0.0, 0.5]);

        let sub = img.subset(Region::new(1, 3)).unwrap();
        assert_eq!(sub.region(), Region::new(1, 3));
        assert_eq!(sub.get(1), [0.5, 0.0, 0.0, 0.5]);
        assert_eq!(sub.get(2), [0.0, 0.5, 0.0, 0.5]);

        let disjoint = img
            .subset(Region::new(1, 2))
            .unwrap()
            .subset(Region::new(3, 4))
            .unwrap();
        assert!(disjoint.is_empty());

        assert!(img.subset(Region::new(0, 5)).is_err());
    }

    #[test]
    fn test_split_moves_pixels() {
        let mut img = Image::<RgbaF32>::full(3, 1);
        img.put(0, [1.0, 0.0, 0.0, 1.0]);
        img.put(2, [0.0, 0.0, 1.0, 1.0]);

        let (lower, upper) = img.split();
        assert_eq!(lower.region(), Region::new(0, 1));
        assert_eq!(upper.region(), Region::new(1, 3));
        assert_eq!(lower.get(0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(upper.get(2), [0.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_serialize_round_trip() {
        let mut img = Image::<RgbaU8Z>::new(4, 2, Region::new(2, 7)).unwrap();
        for i in 2..7 {
            img.put(
                i,
                DepthRgba8 {
                    color: [i as u8, 0, 255 - i as u8, 255],
                    depth: i as f32 * 0.125,
                },
            );
        }
        let bytes = img.to_bytes();
        assert_eq!(bytes.len(), 5 * RgbaU8Z::BYTES_PER_PIXEL);

        let back = Image::<RgbaU8Z>::from_bytes(&bytes, 4, 2, Region::new(2, 7)).unwrap();
        assert_eq!(back, img);
    }

    #[test]
    fn test_from_bytes_rejects_bad_length() {
        let bytes = vec![0u8; 7];
        assert!(matches!(
            Image::<RgbaU8Z>::from_bytes(&bytes, 4, 2, Region::new(0, 1)),
            Err(Error::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_copy_from() {
        let mut full = Image::<RgbaU8Z>::full(2, 2);
        let mut strip = Image::<RgbaU8Z>::new(2, 2, Region::new(1, 3)).unwrap();
        let p = DepthRgba8 {
            color: [7, 7, 7, 255],
            depth: 0.25,
        };
        strip.put(1, p);
        strip.put(2, p);
        full.copy_from(&strip).unwrap();
        assert_eq!(full.get(0), RgbaU8Z::clear());
        assert_eq!(full.get(1), p);
        assert_eq!(full.get(2), p);
        assert_eq!(full.get(3), RgbaU8Z::clear());
    }
}
