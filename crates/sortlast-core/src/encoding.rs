//! Pixel encodings and their blending semantics.
//!
//! This module defines the closed set of framebuffer encodings the
//! compositors operate on. Each encoding is a zero-sized marker type
//! implementing [`Encoding`], which fixes per-pixel storage, the clear
//! value, the binary blend operator, byte-exact serialization, and whether
//! the operator is order-dependent.
//!
//! # Encodings
//!
//! | Marker | Storage | Blend | Order-dependent |
//! |---|---|---|---|
//! | [`RgbaU8Z`] | 4 x u8 color + f32 depth | z-less wins | no |
//! | [`RgbF32Z`] | 3 x f32 color + f32 depth | z-less wins | no |
//! | [`RgbaU8`] | 4 x u8 premultiplied color | alpha over | yes |
//! | [`RgbaF32`] | 4 x f32 premultiplied color | alpha over | yes |
//!
//! # Blending
//!
//! Depth blending keeps whichever operand is nearer (smaller depth); ties
//! keep the front operand. It is commutative, so exchange order across
//! ranks does not matter.
//!
//! Alpha blending is Porter-Duff "over" on **premultiplied** color:
//! `c = front + back * (1 - front.alpha)` componentwise, alpha included.
//! Premultiplication happens once, in [`Encoding::from_fragment`], which
//! makes the operator associative and lets sub-images merge in any
//! grouping as long as the front/back orientation is consistent. The
//! orientation convention is fixed by the compositors: the operand
//! accumulated from lower ranks is the back.
//!
//! # Serialization
//!
//! `encode`/`decode` are byte-exact inverses in host byte order; the
//! system runs within one homogeneous cluster.
//!
//! # Dependencies
//!
//! None beyond std.
//!
//! # Used By
//!
//! - [`crate::image::Image`] - pixel storage and blending
//! - `sortlast-compose` - exchange payloads
//! - `sortlast-paint` - fragment output

/// A pixel carrying 8-bit RGBA color and a 32-bit depth.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRgba8 {
    /// Color channels `[r, g, b, a]`, straight alpha.
    pub color: [u8; 4],
    /// Depth along the view axis; `+inf` for the background.
    pub depth: f32,
}

/// A pixel carrying 32-bit float RGB color and a 32-bit depth.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepthRgbF32 {
    /// Color channels `[r, g, b]`.
    pub color: [f32; 3],
    /// Depth along the view axis; `+inf` for the background.
    pub depth: f32,
}

/// A framebuffer pixel encoding.
///
/// Implemented by the four marker types in this module and nothing else;
/// the compositors are generic over this trait, so dispatch is resolved at
/// compile time with no downcasting.
pub trait Encoding: Copy + Clone + Default + PartialEq + Send + Sync + 'static {
    /// Per-pixel storage.
    type Pixel: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + 'static;

    /// Human-readable encoding name, as accepted by the CLI selector.
    const NAME: &'static str;

    /// Serialized size of one pixel in bytes.
    const BYTES_PER_PIXEL: usize;

    /// `true` iff [`blend`](Encoding::blend) is non-commutative.
    const ORDER_DEPENDENT: bool;

    /// The background value; idempotent under [`blend`](Encoding::blend).
    fn clear() -> Self::Pixel;

    /// Combines two pixels with `front` in front of `back`.
    fn blend(front: Self::Pixel, back: Self::Pixel) -> Self::Pixel;

    /// Builds a storable pixel from a shaded fragment.
    ///
    /// `color` is straight-alpha RGBA in `[0, 1]`; color-only encodings
    /// premultiply here and discard `depth`, depth encodings store both.
    fn from_fragment(color: [f32; 4], depth: f32) -> Self::Pixel;

    /// 8-bit RGBA view of a pixel for display dumps.
    fn display(pixel: Self::Pixel) -> [u8; 4];

    /// Serializes `src` into `dst` in host byte order.
    ///
    /// # Panics
    ///
    /// Panics if `dst.len() != src.len() * BYTES_PER_PIXEL`.
    fn encode(src: &[Self::Pixel], dst: &mut [u8]);

    /// Deserializes `src` into `dst`; exact inverse of `encode`.
    ///
    /// # Panics
    ///
    /// Panics if `src.len() != dst.len() * BYTES_PER_PIXEL`.
    fn decode(src: &[u8], dst: &mut [Self::Pixel]);
}

/// Quantizes a `[0, 1]` float channel to 8 bits, round-to-nearest.
#[inline]
fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// `round(v * a / 255)` for 8-bit channel `v` and weight `a`.
#[inline]
fn mul8(v: u8, a: u8) -> u8 {
    ((v as u32 * a as u32 + 127) / 255) as u8
}

/// 8-bit RGBA color with 32-bit depth; z-less blending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbaU8Z;

impl Encoding for RgbaU8Z {
    type Pixel = DepthRgba8;

    const NAME: &'static str = "rgba8z";
    const BYTES_PER_PIXEL: usize = 8;
    const ORDER_DEPENDENT: bool = false;

    #[inline]
    fn clear() -> Self::Pixel {
        DepthRgba8 {
            color: [0, 0, 0, 0],
            depth: f32::INFINITY,
        }
    }

    #[inline]
    fn blend(front: Self::Pixel, back: Self::Pixel) -> Self::Pixel {
        if back.depth < front.depth { back } else { front }
    }

    #[inline]
    fn from_fragment(color: [f32; 4], depth: f32) -> Self::Pixel {
        DepthRgba8 {
            color: [
                quantize(color[0]),
                quantize(color[1]),
                quantize(color[2]),
                quantize(color[3]),
            ],
            depth,
        }
    }

    #[inline]
    fn display(pixel: Self::Pixel) -> [u8; 4] {
        pixel.color
    }

    fn encode(src: &[Self::Pixel], dst: &mut [u8]) {
        assert_eq!(dst.len(), src.len() * Self::BYTES_PER_PIXEL);
        for (pixel, out) in src.iter().zip(dst.chunks_exact_mut(Self::BYTES_PER_PIXEL)) {
            out[..4].copy_from_slice(&pixel.color);
            out[4..].copy_from_slice(&pixel.depth.to_ne_bytes());
        }
    }

    fn decode(src: &[u8], dst: &mut [Self::Pixel]) {
        assert_eq!(src.len(), dst.len() * Self::BYTES_PER_PIXEL);
        for (out, raw) in dst.iter_mut().zip(src.chunks_exact(Self::BYTES_PER_PIXEL)) {
            out.color.copy_from_slice(&raw[..4]);
            out.depth = f32::from_ne_bytes([raw[4], raw[5], raw[6], raw[7]]);
        }
    }
}

/// 32-bit float RGB color with 32-bit depth; z-less blending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbF32Z;

impl Encoding for RgbF32Z {
    type Pixel = DepthRgbF32;

    const NAME: &'static str = "rgbf32z";
    const BYTES_PER_PIXEL: usize = 16;
    const ORDER_DEPENDENT: bool = false;

    #[inline]
    fn clear() -> Self::Pixel {
        DepthRgbF32 {
            color: [0.0, 0.0, 0.0],
            depth: f32::INFINITY,
        }
    }

    #[inline]
    fn blend(front: Self::Pixel, back: Self::Pixel) -> Self::Pixel {
        if back.depth < front.depth { back } else { front }
    }

    #[inline]
    fn from_fragment(color: [f32; 4], depth: f32) -> Self::Pixel {
        DepthRgbF32 {
            color: [color[0], color[1], color[2]],
            depth,
        }
    }

    #[inline]
    fn display(pixel: Self::Pixel) -> [u8; 4] {
        [
            quantize(pixel.color[0]),
            quantize(pixel.color[1]),
            quantize(pixel.color[2]),
            255,
        ]
    }

    fn encode(src: &[Self::Pixel], dst: &mut [u8]) {
        assert_eq!(dst.len(), src.len() * Self::BYTES_PER_PIXEL);
        for (pixel, out) in src.iter().zip(dst.chunks_exact_mut(Self::BYTES_PER_PIXEL)) {
            out[..4].copy_from_slice(&pixel.color[0].to_ne_bytes());
            out[4..8].copy_from_slice(&pixel.color[1].to_ne_bytes());
            out[8..12].copy_from_slice(&pixel.color[2].to_ne_bytes());
            out[12..].copy_from_slice(&pixel.depth.to_ne_bytes());
        }
    }

    fn decode(src: &[u8], dst: &mut [Self::Pixel]) {
        assert_eq!(src.len(), dst.len() * Self::BYTES_PER_PIXEL);
        for (out, raw) in dst.iter_mut().zip(src.chunks_exact(Self::BYTES_PER_PIXEL)) {
            for (i, channel) in raw[..12].chunks_exact(4).enumerate() {
                out.color[i] = f32::from_ne_bytes([channel[0], channel[1], channel[2], channel[3]]);
            }
            out.depth = f32::from_ne_bytes([raw[12], raw[13], raw[14], raw[15]]);
        }
    }
}

/// 8-bit premultiplied RGBA color, no depth; alpha-over blending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbaU8;

impl Encoding for RgbaU8 {
    type Pixel = [u8; 4];

    const NAME: &'static str = "rgba8";
    const BYTES_PER_PIXEL: usize = 4;
    const ORDER_DEPENDENT: bool = true;

    #[inline]
    fn clear() -> Self::Pixel {
        [0, 0, 0, 0]
    }

    #[inline]
    fn blend(front: Self::Pixel, back: Self::Pixel) -> Self::Pixel {
        let weight = 255 - front[3];
        let mut out = [0u8; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            *channel = front[i].saturating_add(mul8(back[i], weight));
        }
        out
    }

    #[inline]
    fn from_fragment(color: [f32; 4], _depth: f32) -> Self::Pixel {
        let alpha = color[3];
        [
            quantize(color[0] * alpha),
            quantize(color[1] * alpha),
            quantize(color[2] * alpha),
            quantize(alpha),
        ]
    }

    #[inline]
    fn display(pixel: Self::Pixel) -> [u8; 4] {
        pixel
    }

    fn encode(src: &[Self::Pixel], dst: &mut [u8]) {
        assert_eq!(dst.len(), src.len() * Self::BYTES_PER_PIXEL);
        for (pixel, out) in src.iter().zip(dst.chunks_exact_mut(Self::BYTES_PER_PIXEL)) {
            out.copy_from_slice(pixel);
        }
    }

    fn decode(src: &[u8], dst: &mut [Self::Pixel]) {
        assert_eq!(src.len(), dst.len() * Self::BYTES_PER_PIXEL);
        for (out, raw) in dst.iter_mut().zip(src.chunks_exact(Self::BYTES_PER_PIXEL)) {
            out.copy_from_slice(raw);
        }
    }
}

/// 32-bit float premultiplied RGBA color, no depth; alpha-over blending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RgbaF32;

impl Encoding for RgbaF32 {
    type Pixel = [f32; 4];

    const NAME: &'static str = "rgbaf32";
    const BYTES_PER_PIXEL: usize = 16;
    const ORDER_DEPENDENT: bool = true;

    #[inline]
    fn clear() -> Self::Pixel {
        [0.0, 0.0, 0.0, 0.0]
    }

    #[inline]
    fn blend(front: Self::Pixel, back: Self::Pixel) -> Self::Pixel {
        let weight = 1.0 - front[3];
        [
            front[0] + back[0] * weight,
            front[1] + back[1] * weight,
            front[2] + back[2] * weight,
            front[3] + back[3] * weight,
        ]
    }

    #[inline]
    fn from_fragment(color: [f32; 4], _depth: f32) -> Self::Pixel {
        let alpha = color[3];
        [
            color[0] * alpha,
            color[1] * alpha,
            color[2] * alpha,
            alpha,
        ]
    }

    #[inline]
    fn display(pixel: Self::Pixel) -> [u8; 4] {
        [
            quantize(pixel[0]),
            quantize(pixel[1]),
            quantize(pixel[2]),
            quantize(pixel[3]),
        ]
    }

    fn encode(src: &[Self::Pixel], dst: &mut [u8]) {
        assert_eq!(dst.len(), src.len() * Self::BYTES_PER_PIXEL);
        for (pixel, out) in src.iter().zip(dst.chunks_exact_mut(Self::BYTES_PER_PIXEL)) {
            for (channel, bytes) in pixel.iter().zip(out.chunks_exact_mut(4)) {
                bytes.copy_from_slice(&channel.to_ne_bytes());
            }
        }
    }

    fn decode(src: &[u8], dst: &mut [Self::Pixel]) {
        assert_eq!(src.len(), dst.len() * Self::BYTES_PER_PIXEL);
        for (out, raw) in dst.iter_mut().zip(src.chunks_exact(Self::BYTES_PER_PIXEL)) {
            for (channel, bytes) in out.iter_mut().zip(raw.chunks_exact(4)) {
                *channel = f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
            }
        }
    }
}

/// Runtime selector for the four encodings.
///
/// The encodings are distinct; selecting one never falls through to
/// another. Generic code dispatches by matching on this and
/// monomorphizing over the marker type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EncodingKind {
    /// [`RgbaU8Z`]: 8-bit RGBA + depth.
    #[default]
    RgbaU8Z,
    /// [`RgbF32Z`]: float RGB + depth.
    RgbF32Z,
    /// [`RgbaU8`]: 8-bit RGBA, alpha-over.
    RgbaU8,
    /// [`RgbaF32`]: float RGBA, alpha-over.
    RgbaF32,
}

impl EncodingKind {
    /// The selector name, matching `Encoding::NAME`.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RgbaU8Z => RgbaU8Z::NAME,
            Self::RgbF32Z => RgbF32Z::NAME,
            Self::RgbaU8 => RgbaU8::NAME,
            Self::RgbaF32 => RgbaF32::NAME,
        }
    }

    /// Serialized pixel size for the selected encoding.
    pub const fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::RgbaU8Z => RgbaU8Z::BYTES_PER_PIXEL,
            Self::RgbF32Z => RgbF32Z::BYTES_PER_PIXEL,
            Self::RgbaU8 => RgbaU8::BYTES_PER_PIXEL,
            Self::RgbaF32 => RgbaF32::BYTES_PER_PIXEL,
        }
    }

    /// Whether the selected encoding blends order-dependently.
    pub const fn order_dependent(&self) -> bool {
        match self {
            Self::RgbaU8Z => RgbaU8Z::ORDER_DEPENDENT,
            Self::RgbF32Z => RgbF32Z::ORDER_DEPENDENT,
            Self::RgbaU8 => RgbaU8::ORDER_DEPENDENT,
            Self::RgbaF32 => RgbaF32::ORDER_DEPENDENT,
        }
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_is_blend_identity_depth() {
        let clear = RgbaU8Z::clear();
        assert_eq!(RgbaU8Z::blend(clear, clear), clear);

        let p = DepthRgba8 {
            color: [10, 20, 30, 255],
            depth: 0.25,
        };
        assert_eq!(RgbaU8Z::blend(p, clear), p);
        assert_eq!(RgbaU8Z::blend(clear, p), p);
    }

    #[test]
    fn test_clear_is_blend_identity_alpha() {
        let clear = RgbaU8::clear();
        assert_eq!(RgbaU8::blend(clear, clear), clear);

        let p = [100, 50, 0, 200];
        // Front-is-clear leaves the back untouched.
        assert_eq!(RgbaU8::blend(clear, p), p);

        let clear_f = RgbaF32::clear();
        let q = [0.5, 0.25, 0.0, 0.5];
        assert_eq!(RgbaF32::blend(clear_f, q), q);
        assert_eq!(RgbaF32::blend(clear_f, clear_f), clear_f);
    }

    #[test]
    fn test_depth_blend_nearer_wins() {
        let near = DepthRgbF32 {
            color: [1.0, 0.0, 0.0],
            depth: 0.3,
        };
        let far = DepthRgbF32 {
            color: [0.0, 0.0, 1.0],
            depth: 0.7,
        };
        assert_eq!(RgbF32Z::blend(near, far), near);
        assert_eq!(RgbF32Z::blend(far, near), near);
    }

    #[test]
    fn test_depth_blend_tie_keeps_front() {
        let a = DepthRgba8 {
            color: [1, 1, 1, 255],
            depth: 0.5,
        };
        let b = DepthRgba8 {
            color: [2, 2, 2, 255],
            depth: 0.5,
        };
        assert_eq!(RgbaU8Z::blend(a, b), a);
        assert_eq!(RgbaU8Z::blend(b, a), b);
    }

    #[test]
    fn test_alpha_over_u8() {
        // Half-transparent blue over half-transparent red, both
        // premultiplied at 50%: the classic two-layer result.
        let back = RgbaU8::from_fragment([1.0, 0.0, 0.0, 128.0 / 255.0], 0.0);
        let front = RgbaU8::from_fragment([0.0, 0.0, 1.0, 128.0 / 255.0], 0.0);
        assert_eq!(back, [128, 0, 0, 128]);
        assert_eq!(front, [0, 0, 128, 128]);

        let out = RgbaU8::blend(front, back);
        assert_eq!(out, [64, 0, 128, 192]);
    }

    #[test]
    fn test_alpha_over_f32_associative_on_dyadic_values() {
        let a = RgbaF32::from_fragment([1.0, 0.5, 0.0, 0.5], 0.0);
        let b = RgbaF32::from_fragment([0.0, 1.0, 0.25, 0.5], 0.0);
        let c = RgbaF32::from_fragment([0.25, 0.0, 1.0, 0.5], 0.0);

        let left = RgbaF32::blend(RgbaF32::blend(c, b), a);
        let right = RgbaF32::blend(c, RgbaF32::blend(b, a));
        assert_eq!(left, right);
    }

    #[test]
    fn test_opaque_front_hides_back() {
        let front = RgbaF32::from_fragment([0.2, 0.4, 0.6, 1.0], 0.0);
        let back = RgbaF32::from_fragment([1.0, 1.0, 1.0, 1.0], 0.0);
        assert_eq!(RgbaF32::blend(front, back), front);
    }

    #[test]
    fn test_encode_decode_depth_rgba8() {
        let pixels = vec![
            RgbaU8Z::clear(),
            DepthRgba8 {
                color: [255, 0, 0, 255],
                depth: 0.5,
            },
            DepthRgba8 {
                color: [1, 2, 3, 4],
                depth: -7.25,
            },
        ];
        let mut bytes = vec![0u8; pixels.len() * RgbaU8Z::BYTES_PER_PIXEL];
        RgbaU8Z::encode(&pixels, &mut bytes);

        let mut back = vec![RgbaU8Z::clear(); pixels.len()];
        RgbaU8Z::decode(&bytes, &mut back);
        assert_eq!(back, pixels);
    }

    #[test]
    fn test_encode_decode_rgbf32z_with_infinite_depth() {
        let pixels = vec![
            DepthRgbF32 {
                color: [0.1, 0.2, 0.3],
                depth: f32::INFINITY,
            },
            DepthRgbF32 {
                color: [-1.0, 0.0, 2.5],
                depth: 0.125,
            },
        ];
        let mut bytes = vec![0u8; pixels.len() * RgbF32Z::BYTES_PER_PIXEL];
        RgbF32Z::encode(&pixels, &mut bytes);

        let mut back = vec![RgbF32Z::clear(); pixels.len()];
        RgbF32Z::decode(&bytes, &mut back);
        assert_eq!(back, pixels);
        assert!(back[0].depth.is_infinite());
    }

    #[test]
    fn test_from_fragment_premultiplies() {
        assert_eq!(RgbaU8::from_fragment([1.0, 0.0, 0.0, 0.5], 0.0), [128, 0, 0, 128]);
        assert_eq!(
            RgbaF32::from_fragment([1.0, 0.5, 0.0, 0.5], 0.0),
            [0.5, 0.25, 0.0, 0.5]
        );
    }

    #[test]
    fn test_kind_reports_encoding_properties() {
        assert_eq!(EncodingKind::default(), EncodingKind::RgbaU8Z);
        assert_eq!(EncodingKind::RgbaU8Z.name(), "rgba8z");
        assert_eq!(EncodingKind::RgbaU8Z.bytes_per_pixel(), 8);
        assert!(!EncodingKind::RgbF32Z.order_dependent());
        assert!(EncodingKind::RgbaU8.order_dependent());
        assert_eq!(EncodingKind::RgbaF32.bytes_per_pixel(), 16);
    }
}
