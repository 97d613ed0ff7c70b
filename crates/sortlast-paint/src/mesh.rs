//! Triangle soup geometry.

use glam::Vec3;

/// A single flat-shaded triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Vertex positions in model space.
    pub vertices: [Vec3; 3],
    /// Straight-alpha RGBA color, applied to every fragment.
    pub color: [f32; 4],
}

impl Triangle {
    /// Creates a triangle from vertices and a color.
    pub fn new(vertices: [Vec3; 3], color: [f32; 4]) -> Self {
        Self { vertices, color }
    }

    /// The centroid of the three vertices.
    pub fn centroid(&self) -> Vec3 {
        (self.vertices[0] + self.vertices[1] + self.vertices[2]) / 3.0
    }
}

/// An unindexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// The triangles, in painter order.
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Creates a mesh from a triangle list.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Returns `true` if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds of all vertices, or a unit box around the
    /// origin for an empty mesh.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        if self.triangles.is_empty() {
            return (Vec3::splat(-0.5), Vec3::splat(0.5));
        }
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for triangle in &self.triangles {
            for vertex in triangle.vertices {
                min = min.min(vertex);
                max = max.max(vertex);
            }
        }
        (min, max)
    }

    /// A copy of the mesh translated by `offset`.
    pub fn translated(&self, offset: Vec3) -> Mesh {
        Mesh {
            triangles: self
                .triangles
                .iter()
                .map(|t| Triangle {
                    vertices: [
                        t.vertices[0] + offset,
                        t.vertices[1] + offset,
                        t.vertices[2] + offset,
                    ],
                    color: t.color,
                })
                .collect(),
        }
    }

    /// The synthetic test scene: a unit cube centered at the origin,
    /// twelve triangles, one distinct color per face.
    ///
    /// `opacity` becomes the alpha of every face; 1.0 gives a solid box,
    /// lower values exercise the order-dependent encodings.
    pub fn box_mesh(opacity: f32) -> Mesh {
        let alpha = opacity.clamp(0.0, 1.0);
        let p = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);

        // One face: two triangles wound consistently, flat color.
        let face = |a: Vec3, b: Vec3, c: Vec3, d: Vec3, rgb: [f32; 3]| {
            let color = [rgb[0], rgb[1], rgb[2], alpha];
            [
                Triangle::new([a, b, c], color),
                Triangle::new([a, c, d], color),
            ]
        };

        let (lo, hi) = (-0.5, 0.5);
        let mut triangles = Vec::with_capacity(12);
        // -z (back) and +z (front)
        triangles.extend(face(
            p(lo, lo, lo),
            p(hi, lo, lo),
            p(hi, hi, lo),
            p(lo, hi, lo),
            [1.0, 0.0, 0.0],
        ));
        triangles.extend(face(
            p(lo, lo, hi),
            p(hi, lo, hi),
            p(hi, hi, hi),
            p(lo, hi, hi),
            [0.0, 1.0, 0.0],
        ));
        // -x and +x
        triangles.extend(face(
            p(lo, lo, lo),
            p(lo, hi, lo),
            p(lo, hi, hi),
            p(lo, lo, hi),
            [0.0, 0.0, 1.0],
        ));
        triangles.extend(face(
            p(hi, lo, lo),
            p(hi, hi, lo),
            p(hi, hi, hi),
            p(hi, lo, hi),
            [1.0, 1.0, 0.0],
        ));
        // -y and +y
        triangles.extend(face(
            p(lo, lo, lo),
            p(hi, lo, lo),
            p(hi, lo, hi),
            p(lo, lo, hi),
            [1.0, 0.0, 1.0],
        ));
        triangles.extend(face(
            p(lo, hi, lo),
            p(hi, hi, lo),
            p(hi, hi, hi),
            p(lo, hi, hi),
            [0.0, 1.0, 1.0],
        ));
        Mesh::new(triangles)
    }
}
