use terra_assets::{AssetDatabase, AssetDescriptor};
use terra_lod::{
    DEBUG_CLIP_BORDER, DEFAULT_CLIP_BORDER, LodDecision, LodSelector, LodThresholds, ViewParams,
    WebMercator, lod_color, model_transform,
};
use tracing::trace;

use crate::plan::{DrawItem, FramePlan};

/// Culling and LOD parameters for a [`MeshAssetLayer`].
#[derive(Clone, Debug, PartialEq)]
pub struct LayerSettings {
    pub thresholds: LodThresholds,
    pub clip_border: f64,
    pub debug_clip_border: f64,
    /// Cull against `debug_clip_border` so rejected assets vanish inside the
    /// viewport instead of at its edge.
    pub visualize_frustum_culling: bool,
}

impl LayerSettings {
    /// Border in effect for the current debug setting.
    pub fn active_clip_border(&self) -> f64 {
        if self.visualize_frustum_culling {
            self.debug_clip_border
        } else {
            self.clip_border
        }
    }
}

impl Default for LayerSettings {
    fn default() -> Self {
        Self {
            thresholds: LodThresholds::default_contribution(),
            clip_border: DEFAULT_CLIP_BORDER,
            debug_clip_border: DEBUG_CLIP_BORDER,
            visualize_frustum_culling: false,
        }
    }
}

/// Owns an [`AssetDatabase`] and plans which of its meshes to draw each frame.
pub struct MeshAssetLayer {
    database: AssetDatabase,
    settings: LayerSettings,
    selector: LodSelector,
    projection: WebMercator,
    ready: Vec<AssetDescriptor>,
}

impl MeshAssetLayer {
    pub fn new(database: AssetDatabase, settings: LayerSettings) -> Self {
        let selector = LodSelector::new(settings.thresholds.clone(), settings.active_clip_border());
        Self {
            database,
            settings,
            selector,
            projection: WebMercator,
            ready: Vec::new(),
        }
    }

    pub fn database(&self) -> &AssetDatabase {
        &self.database
    }

    /// Mutable access for registering and removing assets.
    pub fn database_mut(&mut self) -> &mut AssetDatabase {
        &mut self.database
    }

    pub fn settings(&self) -> &LayerSettings {
        &self.settings
    }

    pub fn set_visualize_frustum_culling(&mut self, enabled: bool) {
        self.settings.visualize_frustum_culling = enabled;
        self.selector = LodSelector::new(
            self.settings.thresholds.clone(),
            self.settings.active_clip_border(),
        );
    }

    /// Advance the database one frame and decide, for every ready asset,
    /// whether and at which level it is drawn from `view`.
    pub fn plan_frame(&mut self, view: &ViewParams) -> FramePlan {
        self.ready.clear();
        self.database.query_ready(&mut self.ready);

        let mut plan = FramePlan::default();
        for descriptor in &self.ready {
            let Some(mesh) = self.database.get_mesh(&descriptor.uri) else {
                continue;
            };
            let model = model_transform(
                &self.projection,
                descriptor.position,
                &descriptor.local_transform,
                view.zoom,
            );
            let world_view_projection = view.projection * model;
            match self.selector.evaluate(mesh.bounds(), &world_view_projection) {
                LodDecision::Visible(level) => plan.draws.push(DrawItem {
                    uri: descriptor.uri.clone(),
                    world_view_projection,
                    level,
                    color: lod_color(level),
                    index_count: mesh.index_count(),
                }),
                LodDecision::Culled(reason) => {
                    trace!("Culled {}: {:?}", descriptor.uri, reason);
                    plan.record_cull(reason);
                }
            }
        }

        trace!(
            "Frame plan: {} visible, {} outside, {} too small",
            plan.visible_count(),
            plan.culled_outside,
            plan.culled_too_small
        );
        plan
    }
}
