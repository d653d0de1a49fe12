//! Level-of-detail selection and frustum culling from clip-space screen contribution.

mod palette;
mod projection;
mod selector;

pub use palette::{LOD_COLORS, lod_color};
pub use projection::{
    LATITUDE_MAX, PlanarProjection, TILE_SIZE, ViewParams, WebMercator, model_transform,
    zoom_scale,
};
pub use selector::{
    CullReason, DEBUG_CLIP_BORDER, DEFAULT_CLIP_BORDER, LodDecision, LodSelector, LodThresholds,
};
