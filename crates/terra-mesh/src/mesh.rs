//! Triangle mesh produced by the loaders.

use glam::{Vec3, Vec4};
use terra_math::{Bounds3, compute_bounds, compute_vertex_normals};

/// A single mesh vertex: homogeneous position (w = 1) and normal (w = 0).
///
/// Laid out as two `vec4`s so a host can upload `Mesh::vertices` directly.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 4],
    pub normal: [f32; 4],
}

static_assertions::assert_eq_size!(MeshVertex, [f32; 8]);

impl MeshVertex {
    /// A vertex at `position` with a zero normal.
    pub fn new(position: Vec3) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            normal: [0.0; 4],
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec4::from_array(self.position).truncate()
    }

    pub fn normal(&self) -> Vec3 {
        Vec4::from_array(self.normal).truncate()
    }

    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = normal.extend(0.0).to_array();
    }
}

/// Three zero-based vertex indices.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Triangle {
    pub i: u32,
    pub j: u32,
    pub k: u32,
}

static_assertions::assert_eq_size!(Triangle, [u32; 3]);

impl Triangle {
    pub fn new(i: u32, j: u32, k: u32) -> Self {
        Self { i, j, k }
    }

    pub fn indices(&self) -> [u32; 3] {
        [self.i, self.j, self.k]
    }
}

/// An indexed triangle mesh with model-space bounds.
///
/// Invariant: every index of every triangle is `< vertices.len()`.
/// [`Mesh::from_parts`] is the only constructor and checks it.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    bounds: Bounds3,
    vertices: Vec<MeshVertex>,
    triangles: Vec<Triangle>,
}

impl Mesh {
    /// Build a mesh, computing its bounds.
    ///
    /// Returns `None` if any triangle references a vertex that does not exist.
    pub fn from_parts(vertices: Vec<MeshVertex>, triangles: Vec<Triangle>) -> Option<Self> {
        let count = vertices.len() as u64;
        if triangles
            .iter()
            .flat_map(Triangle::indices)
            .any(|idx| u64::from(idx) >= count)
        {
            return None;
        }

        let bounds = compute_bounds(vertices.iter().map(MeshVertex::position));
        Some(Self {
            bounds,
            vertices,
            triangles,
        })
    }

    /// Replace every vertex normal with the smoothed face-normal average.
    pub fn recompute_normals(&mut self) {
        let positions: Vec<Vec3> = self.vertices.iter().map(MeshVertex::position).collect();
        let triangles: Vec<[u32; 3]> = self.triangles.iter().map(Triangle::indices).collect();
        let normals = compute_vertex_normals(&positions, &triangles);
        for (vertex, normal) in self.vertices.iter_mut().zip(normals) {
            vertex.set_normal(normal);
        }
    }

    pub fn bounds(&self) -> &Bounds3 {
        &self.bounds
    }

    pub fn vertices(&self) -> &[MeshVertex] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of indices a host would draw (three per triangle).
    pub fn index_count(&self) -> usize {
        self.triangles.len() * 3
    }
}
