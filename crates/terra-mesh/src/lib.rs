//! Mesh data structures and the OBJ text decoder used by the asset loader.

pub mod mesh;
pub mod obj;
pub mod status;

pub use mesh::{Mesh, MeshVertex, Triangle};
pub use obj::{ParseReport, parse_obj};
pub use status::LoadStatus;
