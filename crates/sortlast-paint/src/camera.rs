//! View and projection transforms.

use glam::{Mat4, Vec3};

/// A view/projection pair shared by every rank of a run.
///
/// All ranks must paint with the same camera or the composited image is
/// meaningless; build it from [`scene_bounds`](crate::distribute::scene_bounds)
/// so the inputs are identical everywhere.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    view: Mat4,
    proj: Mat4,
}

impl Camera {
    /// Creates a camera from explicit view and projection matrices.
    pub fn new(view: Mat4, proj: Mat4) -> Self {
        Self { view, proj }
    }

    /// The identity camera: vertices are taken as normalized device
    /// coordinates directly, depth as-is. Useful for exercising the
    /// rasterizer with hand-placed geometry.
    pub fn identity() -> Self {
        Self {
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
        }
    }

    /// Frames the axis-aligned box `[min, max]` head-on from the +z side.
    ///
    /// The eye sits on the +z axis through the box center, so view depth
    /// decreases with scene z: geometry at greater z is nearer the
    /// camera. Duplicate distribution stacks rank cells along +z, which
    /// is what keeps rank order back-to-front under this camera.
    pub fn frame_box(min: Vec3, max: Vec3, width: u32, height: u32) -> Self {
        let center = (min + max) * 0.5;
        let radius = ((max - min).length() * 0.5).max(1e-3);
        let distance = radius * 2.5;
        let eye = center + Vec3::new(0.0, 0.0, distance);

        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let near = (distance - radius * 1.5).max(radius * 0.01);
        let far = distance + radius * 1.5;
        Self {
            view: Mat4::look_at_rh(eye, center, Vec3::Y),
            proj: Mat4::perspective_rh(45f32.to_radians(), aspect, near, far),
        }
    }

    /// The combined projection * view matrix.
    pub fn view_proj(&self) -> Mat4 {
        self.proj * self.view
    }
}
