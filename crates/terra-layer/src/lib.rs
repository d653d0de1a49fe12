//! Render-host glue: turns ready assets into a per-frame list of draws.
//!
//! Each frame the host calls [`MeshAssetLayer::plan_frame`] with its camera,
//! then uploads and draws the returned [`FramePlan`]. GPU work stays in the
//! host.

mod layer;
mod plan;

pub use layer::{LayerSettings, MeshAssetLayer};
pub use plan::{DrawItem, FramePlan};
