//! Minimal Wavefront OBJ decoder.
//!
//! Supported grammar, one statement per line:
//!
//! ```text
//! # comment
//! v  <x> <y> <z>      position
//! vn <x> <y> <z>      normal, matched to positions by order
//! f  <i> <j> <k>      triangle, 1-based indices
//! ```
//!
//! Every statement takes exactly three fields. The optional `w` of a `v`
//! line and the slash forms of `f` are not accepted. Coordinates must be
//! finite.
//!
//! Anything else is rejected as [`LoadStatus::InvalidData`]. When the file
//! carries one `vn` per `v` the normals are used as given; otherwise they are
//! synthesized from the triangles.

use std::str::{FromStr, SplitWhitespace};

use glam::Vec3;
use tracing::debug;

use crate::mesh::{Mesh, MeshVertex, Triangle};
use crate::status::LoadStatus;

/// Counters and status collected while decoding an OBJ payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseReport {
    pub status: LoadStatus,
    pub position_count: usize,
    pub normal_count: usize,
    pub triangle_count: usize,
}

impl Default for ParseReport {
    fn default() -> Self {
        Self {
            status: LoadStatus::Ok,
            position_count: 0,
            normal_count: 0,
            triangle_count: 0,
        }
    }
}

impl ParseReport {
    fn fail(mut self) -> Self {
        self.status = LoadStatus::InvalidData;
        self
    }
}

/// Decode an OBJ payload.
///
/// The mesh is returned only when the report status is [`LoadStatus::Ok`].
/// On failure the report still carries the counts reached before the first
/// bad line.
pub fn parse_obj(data: &[u8]) -> (ParseReport, Option<Mesh>) {
    let report = ParseReport::default();
    if data.is_empty() {
        return (report.fail(), None);
    }
    let Ok(text) = std::str::from_utf8(data) else {
        return (report.fail(), None);
    };

    let mut state = ObjState::default();
    for (line_no, line) in text.lines().enumerate() {
        if state.parse_line(line).is_none() {
            debug!("OBJ rejected at line {}: {:?}", line_no + 1, line);
            return (state.report.fail(), None);
        }
    }

    match state.finish() {
        Some(mesh) => (state.report, Some(mesh)),
        None => (state.report.fail(), None),
    }
}

#[derive(Default)]
struct ObjState {
    report: ParseReport,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    faces: Vec<[i64; 3]>,
}

impl ObjState {
    /// Returns `None` for a line that is not valid in the supported grammar.
    fn parse_line(&mut self, line: &str) -> Option<()> {
        if line.starts_with('#') {
            return Some(());
        }
        let mut fields = line.split_whitespace();
        let Some(tag) = fields.next() else {
            // Empty or whitespace-only.
            return Some(());
        };

        match tag {
            "v" => {
                self.positions.push(read_vec3(&mut fields)?);
                self.report.position_count += 1;
            }
            "vn" => {
                self.normals.push(read_vec3(&mut fields)?);
                self.report.normal_count += 1;
            }
            "f" => {
                let [i, j, k] = read_exact::<i64, 3>(&mut fields)?;
                self.faces.push([i, j, k]);
                self.report.triangle_count += 1;
            }
            _ => return None,
        }
        Some(())
    }

    /// Convert indices, validate them, and assemble the mesh.
    fn finish(&self) -> Option<Mesh> {
        let vertex_count = self.positions.len() as i64;
        let mut triangles = Vec::with_capacity(self.faces.len());
        for face in &self.faces {
            // OBJ indices start at 1.
            let [i, j, k] = face.map(|idx| idx.saturating_sub(1));
            if [i, j, k].iter().any(|&idx| idx < 0 || idx >= vertex_count) {
                debug!("OBJ face {:?} references a missing vertex", face);
                return None;
            }
            triangles.push(Triangle::new(i as u32, j as u32, k as u32));
        }

        let mut vertices: Vec<MeshVertex> =
            self.positions.iter().copied().map(MeshVertex::new).collect();
        let passthrough = self.report.position_count == self.report.normal_count;
        if passthrough {
            for (vertex, normal) in vertices.iter_mut().zip(&self.normals) {
                vertex.set_normal(*normal);
            }
        }

        let mut mesh = Mesh::from_parts(vertices, triangles)?;
        if !passthrough {
            mesh.recompute_normals();
        }
        Some(mesh)
    }
}

/// Coordinates must be finite; `inf` and `NaN` parse as `f32` but are rejected.
fn read_vec3(fields: &mut SplitWhitespace<'_>) -> Option<Vec3> {
    read_exact::<f32, 3>(fields)
        .map(Vec3::from_array)
        .filter(|v| v.is_finite())
}

/// Read exactly `N` numeric fields; missing, malformed, or extra fields fail.
fn read_exact<T: FromStr + Copy + Default, const N: usize>(
    fields: &mut SplitWhitespace<'_>,
) -> Option<[T; N]> {
    let mut out = [T::default(); N];
    for slot in &mut out {
        *slot = fields.next()?.parse().ok()?;
    }
    if fields.next().is_some() {
        return None;
    }
    Some(out)
}
