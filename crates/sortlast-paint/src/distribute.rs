//! Geometry distribution across ranks.
//!
//! Before painting, every rank must own a triangle subset. Two modes:
//!
//! - [`Distribution::Duplicate`] - every rank paints the whole mesh,
//!   translated to its cell of a near-cubic rank grid. Cells are laid out
//!   so that the slowest-varying grid axis is the view axis and cell depth
//!   increases toward the camera with rank, which keeps rank order
//!   back-to-front for order-dependent encodings.
//! - [`Distribution::Partition`] - each rank gets a contiguous slice of
//!   the triangle list; every triangle is painted by exactly one rank.
//!
//! Either way the local image a rank paints is authoritative; the
//! compositors never look at geometry.

use glam::Vec3;

use crate::mesh::Mesh;

/// How the mesh is spread across the group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Distribution {
    /// Whole mesh per rank, translated into a rank grid.
    #[default]
    Duplicate,
    /// Contiguous triangle slice per rank.
    Partition,
}

/// Factors `size` into a near-cubic `(gx, gy, gz)` grid, `gx*gy*gz == size`.
fn grid_dims(size: usize) -> (usize, usize, usize) {
    let mut gz = (size as f64).cbrt() as usize + 1;
    while gz > 1 && (gz * gz * gz > size || size % gz != 0) {
        gz -= 1;
    }
    let rest = size / gz;
    let mut gy = (rest as f64).sqrt() as usize + 1;
    while gy > 1 && (gy * gy > rest || rest % gy != 0) {
        gy -= 1;
    }
    (rest / gy, gy, gz)
}

/// Cell offset for `rank` when duplicating a mesh of extent `extent`.
///
/// The z index varies slowest, so consecutive rank blocks stack along the
/// view axis; the grid is centered on the origin.
fn duplicate_offset(extent: Vec3, rank: usize, size: usize) -> Vec3 {
    let (gx, gy, gz) = grid_dims(size);
    let ix = rank % gx;
    let iy = (rank / gx) % gy;
    let iz = rank / (gx * gy);
    let index = Vec3::new(ix as f32, iy as f32, iz as f32);
    let center = Vec3::new(
        (gx as f32 - 1.0) / 2.0,
        (gy as f32 - 1.0) / 2.0,
        (gz as f32 - 1.0) / 2.0,
    );
    (index - center) * extent
}

/// Produces the triangle subset `rank` paints.
///
/// # Panics
///
/// Panics if `rank >= size` or `size` is zero.
pub fn distribute(mesh: &Mesh, mode: Distribution, rank: usize, size: usize) -> Mesh {
    assert!(size > 0, "group size must be at least 1");
    assert!(rank < size, "rank {rank} out of range for group of {size}");
    match mode {
        Distribution::Duplicate => {
            let (min, max) = mesh.bounds();
            mesh.translated(duplicate_offset(max - min, rank, size))
        }
        Distribution::Partition => {
            let total = mesh.len();
            let begin = rank * total / size;
            let end = (rank + 1) * total / size;
            Mesh::new(mesh.triangles[begin..end].to_vec())
        }
    }
}

/// Bounds of the whole distributed scene, identical on every rank.
///
/// Every rank needs the same camera; this computes the union of all
/// ranks' geometry bounds without materializing their meshes.
pub fn scene_bounds(mesh: &Mesh, mode: Distribution, size: usize) -> (Vec3, Vec3) {
    let (min, max) = mesh.bounds();
    match mode {
        Distribution::Partition => (min, max),
        Distribution::Duplicate => {
            let extent = max - min;
            let lo = duplicate_offset(extent, 0, size);
            let hi = duplicate_offset(extent, size - 1, size);
            // Offsets are monotone per axis across the grid; cells at the
            // two corner ranks bound the arrangement.
            (min + lo.min(hi), max + lo.max(hi))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_grid_dims_exact_factorization() {
        for size in 1..=32 {
            let (gx, gy, gz) = grid_dims(size);
            assert_eq!(gx * gy * gz, size, "size {size}");
            assert!(gz <= gy || gy == 1);
        }
        assert_eq!(grid_dims(8), (2, 2, 2));
        assert_eq!(grid_dims(4), (2, 2, 1));
    }

    #[test]
    fn test_duplicate_offsets_stack_along_z_by_rank_block() {
        let extent = Vec3::ONE;
        // With 8 ranks in a 2x2x2 grid, ranks 0-3 sit in the far slab and
        // ranks 4-7 in the near slab.
        for rank in 0..4 {
            assert_relative_eq!(duplicate_offset(extent, rank, 8).z, -0.5);
        }
        for rank in 4..8 {
            assert_relative_eq!(duplicate_offset(extent, rank, 8).z, 0.5);
        }
    }

    #[test]
    fn test_partition_covers_all_triangles_once() {
        let mesh = Mesh::box_mesh(1.0);
        let mut seen = 0;
        for rank in 0..5 {
            let part = distribute(&mesh, Distribution::Partition, rank, 5);
            seen += part.len();
        }
        assert_eq!(seen, mesh.len());
    }

    #[test]
    fn test_duplicate_single_rank_is_identity() {
        let mesh = Mesh::box_mesh(1.0);
        let out = distribute(&mesh, Distribution::Duplicate, 0, 1);
        assert_eq!(out, mesh);
    }

    #[test]
    fn test_scene_bounds_cover_all_cells() {
        let mesh = Mesh::box_mesh(1.0);
        let (lo, hi) = scene_bounds(&mesh, Distribution::Duplicate, 8);
        for rank in 0..8 {
            let (min, max) = distribute(&mesh, Distribution::Duplicate, rank, 8).bounds();
            assert!(min.cmpge(lo).all(), "rank {rank}");
            assert!(max.cmple(hi).all(), "rank {rank}");
        }
    }
}
