//! Face and vertex normal computation.

use glam::Vec3;

/// Unnormalized face normal of a triangle: `(v1 - v0) x (v2 - v0)`.
///
/// The sign follows the winding of the inputs; it is not canonicalized.
pub fn triangle_normal(v0: Vec3, v1: Vec3, v2: Vec3) -> Vec3 {
    (v1 - v0).cross(v2 - v0)
}

/// Compute smooth per-vertex normals from triangle connectivity.
///
/// Each vertex receives the plain sum of the face normals of every triangle
/// that references it (no area or angle weighting), normalized afterwards.
/// Vertices referenced by no triangle, or whose summed normal cancels out,
/// get `Vec3::ZERO`.
///
/// All indices must be `< positions.len()`.
pub fn compute_vertex_normals(positions: &[Vec3], triangles: &[[u32; 3]]) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for &[i, j, k] in triangles {
        let (i, j, k) = (i as usize, j as usize, k as usize);
        let n = triangle_normal(positions[i], positions[j], positions[k]);
        sums[i] += n;
        sums[j] += n;
        sums[k] += n;
    }

    sums.into_iter().map(Vec3::normalize_or_zero).collect()
}
