//! Geometry utilities for mesh assets: bounding boxes, clip-space projection, and normals.

mod bounds;
mod clip;
mod geo;
mod normals;

pub use bounds::{Bounds3, compute_bounds};
pub use clip::{ClipBounds, project_to_clip_space};
pub use geo::LatLng;
pub use normals::{compute_vertex_normals, triangle_normal};
