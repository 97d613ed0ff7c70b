//! The software rasterizer.
//!
//! Turns a rank's triangle subset into its local framebuffer. Triangles
//! are transformed by the camera, perspective-divided, mapped to pixel
//! coordinates, and filled with a barycentric edge-function test at pixel
//! centers; depth is the interpolated normalized device z, so smaller
//! means nearer. Every covered fragment is written through the encoding's
//! blend operator with the fragment in front: a z test for the depth
//! encodings, alpha-over for the color-only ones.
//!
//! For order-dependent encodings the triangle list is sorted back to
//! front by projected centroid depth before rasterizing, as the alpha
//! operator requires. The cross-rank half of that ordering is the
//! distribution's job (lower rank = farther).
//!
//! Triangles touching the camera plane are dropped rather than clipped;
//! the framing camera keeps the synthetic scenes well inside the frustum.

use glam::{Mat4, Vec3};
use tracing::debug;

use sortlast_core::{Encoding, Image};

use crate::camera::Camera;
use crate::mesh::{Mesh, Triangle};

/// Paints `mesh` into `image`, which must cover the full framebuffer.
///
/// # Panics
///
/// Panics in debug builds if `image` does not store the full region.
pub fn paint<E: Encoding>(mesh: &Mesh, camera: &Camera, image: &mut Image<E>) {
    debug_assert_eq!(
        image.region().len(),
        image.pixel_count(),
        "paint target must cover the full framebuffer"
    );
    let view_proj = camera.view_proj();

    debug!(
        triangles = mesh.len(),
        order_dependent = E::ORDER_DEPENDENT,
        "painting"
    );
    if E::ORDER_DEPENDENT {
        for index in back_to_front(mesh, &view_proj) {
            rasterize(&mesh.triangles[index], &view_proj, image);
        }
    } else {
        for triangle in &mesh.triangles {
            rasterize(triangle, &view_proj, image);
        }
    }
}

/// Triangle indices sorted by descending projected centroid depth
/// (farthest first).
fn back_to_front(mesh: &Mesh, view_proj: &Mat4) -> Vec<usize> {
    let mut keyed: Vec<(f32, usize)> = mesh
        .triangles
        .iter()
        .enumerate()
        .map(|(index, triangle)| {
            let clip = *view_proj * triangle.centroid().extend(1.0);
            // Degenerate projections sort to the back; rasterize drops
            // them anyway.
            let depth = if clip.w > f32::EPSILON {
                clip.z / clip.w
            } else {
                f32::MAX
            };
            (depth, index)
        })
        .collect();
    keyed.sort_by(|a, b| b.0.total_cmp(&a.0));
    keyed.into_iter().map(|(_, index)| index).collect()
}

/// Signed doubled area of triangle (a, b, p) in screen space.
#[inline]
fn edge(ax: f32, ay: f32, bx: f32, by: f32, px: f32, py: f32) -> f32 {
    (bx - ax) * (py - ay) - (by - ay) * (px - ax)
}

fn rasterize<E: Encoding>(triangle: &Triangle, view_proj: &Mat4, image: &mut Image<E>) {
    let width = image.width();
    let height = image.height();
    let (wf, hf) = (width as f32, height as f32);

    // Project to screen: x right, y down, z the 0..1 depth.
    let mut screen = [Vec3::ZERO; 3];
    for (corner, vertex) in screen.iter_mut().zip(triangle.vertices) {
        let clip = *view_proj * vertex.extend(1.0);
        if clip.w <= f32::EPSILON {
            return;
        }
        let ndc = clip / clip.w;
        *corner = Vec3::new(
            (ndc.x + 1.0) * 0.5 * wf,
            (1.0 - ndc.y) * 0.5 * hf,
            ndc.z,
        );
    }

    let area = edge(
        screen[0].x, screen[0].y, screen[1].x, screen[1].y, screen[2].x, screen[2].y,
    );
    if area.abs() < f32::EPSILON {
        return;
    }

    let min_x = screen.iter().map(|v| v.x).fold(f32::INFINITY, f32::min);
    let max_x = screen.iter().map(|v| v.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = screen.iter().map(|v| v.y).fold(f32::INFINITY, f32::min);
    let max_y = screen.iter().map(|v| v.y).fold(f32::NEG_INFINITY, f32::max);

    let x_begin = (min_x.floor().max(0.0)) as u32;
    let x_end = (max_x.ceil().min(wf)) as u32;
    let y_begin = (min_y.floor().max(0.0)) as u32;
    let y_end = (max_y.ceil().min(hf)) as u32;

    for py in y_begin..y_end {
        for px in x_begin..x_end {
            let cx = px as f32 + 0.5;
            let cy = py as f32 + 0.5;
            // Barycentric weights, normalized by the signed area so the
            // inside test is winding-independent.
            let w0 = edge(screen[1].x, screen[1].y, screen[2].x, screen[2].y, cx, cy) / area;
            let w1 = edge(screen[2].x, screen[2].y, screen[0].x, screen[0].y, cx, cy) / area;
            let w2 = edge(screen[0].x, screen[0].y, screen[1].x, screen[1].y, cx, cy) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let depth = w0 * screen[0].z + w1 * screen[1].z + w2 * screen[2].z;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }
            let index = py as usize * width as usize + px as usize;
            image.blend_pixel(index, E::from_fragment(triangle.color, depth));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use sortlast_core::{RgbaF32, RgbaU8Z, RgbF32Z};

    /// A small triangle around NDC point (x, y) at depth z, covering only
    /// pixels whose centers fall within `radius` NDC units.
    fn ndc_triangle(x: f32, y: f32, z: f32, radius: f32, color: [f32; 4]) -> Triangle {
        Triangle::new(
            [
                Vec3::new(x - radius, y - radius, z),
                Vec3::new(x + radius, y - radius, z),
                Vec3::new(x, y + radius, z),
            ],
            color,
        )
    }

    /// NDC coordinates of the center of pixel (col, row).
    fn pixel_center_ndc(col: u32, row: u32, width: u32, height: u32) -> (f32, f32) {
        (
            (col as f32 + 0.5) / width as f32 * 2.0 - 1.0,
            1.0 - (row as f32 + 0.5) / height as f32 * 2.0,
        )
    }

    #[test]
    fn test_paints_single_pixel() {
        let mut image = Image::<RgbaU8Z>::full(4, 4);
        let (x, y) = pixel_center_ndc(1, 1, 4, 4);
        let mesh = Mesh::new(vec![ndc_triangle(x, y, 0.5, 0.2, [1.0, 0.0, 0.0, 1.0])]);
        paint(&mesh, &Camera::identity(), &mut image);

        // Pixel index 5 is row 1, column 1.
        assert_eq!(image.get(5).color, [255, 0, 0, 255]);
        assert!((image.get(5).depth - 0.5).abs() < 1e-6);
        for index in (0..16).filter(|&i| i != 5) {
            assert_eq!(image.get(index), RgbaU8Z::clear(), "pixel {index}");
        }
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut image = Image::<RgbF32Z>::full(2, 2);
        let (x, y) = pixel_center_ndc(0, 0, 2, 2);
        let mesh = Mesh::new(vec![
            ndc_triangle(x, y, 0.8, 0.4, [0.0, 0.0, 1.0, 1.0]),
            ndc_triangle(x, y, 0.2, 0.4, [1.0, 0.0, 0.0, 1.0]),
        ]);
        paint(&mesh, &Camera::identity(), &mut image);
        assert_eq!(image.get(0).color, [1.0, 0.0, 0.0]);
        assert!((image.get(0).depth - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_order_dependent_sorts_back_to_front() {
        // The mesh lists the near translucent layer first; the painter
        // must still put the far layer down first.
        let mut image = Image::<RgbaF32>::full(1, 1);
        let (x, y) = pixel_center_ndc(0, 0, 1, 1);
        let mesh = Mesh::new(vec![
            ndc_triangle(x, y, 0.25, 0.9, [0.0, 0.0, 1.0, 0.5]),
            ndc_triangle(x, y, 0.75, 0.9, [1.0, 0.0, 0.0, 0.5]),
        ]);
        paint(&mesh, &Camera::identity(), &mut image);

        let far = RgbaF32::from_fragment([1.0, 0.0, 0.0, 0.5], 0.75);
        let near = RgbaF32::from_fragment([0.0, 0.0, 1.0, 0.5], 0.25);
        assert_eq!(image.get(0), RgbaF32::blend(near, far));
    }

    #[test]
    fn test_offscreen_geometry_is_clipped_to_bounds() {
        let mut image = Image::<RgbaU8Z>::full(2, 2);
        // Covers the whole frame and far beyond it.
        let mesh = Mesh::new(vec![Triangle::new(
            [
                Vec3::new(-10.0, -10.0, 0.5),
                Vec3::new(10.0, -10.0, 0.5),
                Vec3::new(0.0, 10.0, 0.5),
            ],
            [0.0, 1.0, 0.0, 1.0],
        )]);
        paint(&mesh, &Camera::identity(), &mut image);
        for index in 0..4 {
            assert_eq!(image.get(index).color, [0, 255, 0, 255]);
        }
    }

    #[test]
    fn test_behind_camera_triangle_is_dropped() {
        let mut image = Image::<RgbaU8Z>::full(2, 2);
        let camera = Camera::frame_box(Vec3::splat(-1.0), Vec3::splat(1.0), 2, 2);
        // Far behind the eye: w <= 0 after projection.
        let mesh = Mesh::new(vec![ndc_triangle(0.0, 0.0, 100.0, 0.5, [1.0, 1.0, 1.0, 1.0])]);
        paint(&mesh, &camera, &mut image);
        for index in 0..4 {
            assert_eq!(image.get(index), RgbaU8Z::clear());
        }
    }
}
