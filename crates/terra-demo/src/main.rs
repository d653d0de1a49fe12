//! Headless demo that streams OBJ meshes and reports per-frame LOD decisions.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p terra-demo -- --asset-dir ./models house.obj tower.obj`.
//! Without positional files a built-in cube is served through the web source.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use glam::{DMat4, DVec3};
use terra_assets::{
    AssetDatabase, AssetDescriptor, LocalFileSource, MemoryFileSource, RetryPolicy, SourceKind,
    SourceRegistry,
};
use terra_config::{CliArgs, Config, default_config_dir};
use terra_layer::{FramePlan, LayerSettings, MeshAssetLayer};
use terra_lod::{LodThresholds, PlanarProjection, TILE_SIZE, ViewParams, WebMercator, zoom_scale};
use terra_math::LatLng;
use tracing::{error, info, warn};

/// Camera target: Helsinki market square.
const CENTER: LatLng = LatLng {
    lat: 60.1675,
    lng: 24.9525,
};

/// Headless viewport size in pixels.
const VIEWPORT: (f64, f64) = (1280.0, 720.0);

/// Spacing between demo assets in degrees.
const ASSET_SPACING_DEG: f64 = 0.0015;

/// Zoom lost per frame, so assets drift through the detail levels.
const ZOOM_OUT_PER_FRAME: f64 = 0.05;

const FRAME_TIME: Duration = Duration::from_millis(16);

const DEMO_CUBE_URI: &str = "demo://cube.obj";

/// Equatorial circumference in meters.
const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// 40 m block with its base on the ground, in meters.
const DEMO_CUBE: &[u8] = b"\
v -20 -20 0
v 20 -20 0
v 20 20 0
v -20 20 0
v -20 -20 40
v 20 -20 40
v 20 20 40
v -20 20 40
f 1 3 2
f 1 4 3
f 5 6 7
f 5 7 8
f 1 2 6
f 1 6 5
f 4 7 3
f 4 8 7
f 1 5 8
f 1 8 4
f 2 3 7
f 2 7 6
";

/// Orthographic camera centred on `center`, one plane unit per pixel.
fn view_at(center: LatLng, zoom: f64) -> ViewParams {
    let c = WebMercator.project(center, zoom_scale(zoom));
    let (half_w, half_h) = (VIEWPORT.0 / 2.0, VIEWPORT.1 / 2.0);
    ViewParams {
        // Plane y grows southwards, so bottom is the larger value.
        projection: DMat4::orthographic_rh(
            c.x - half_w,
            c.x + half_w,
            c.y + half_h,
            c.y - half_h,
            -1.0e6,
            1.0e6,
        ),
        zoom,
    }
}

/// Local transform for meshes authored in meters: zoom-0 plane units per
/// meter at `position`'s latitude.
fn meters_transform(position: LatLng) -> DMat4 {
    let units_per_meter =
        TILE_SIZE / (EARTH_CIRCUMFERENCE_M * position.lat.to_radians().cos().max(1e-6));
    DMat4::from_scale(DVec3::splat(units_per_meter))
}

/// Position of the `index`-th asset on a square grid around [`CENTER`].
fn grid_position(index: usize, count: usize) -> LatLng {
    let side = (count as f64).sqrt().ceil().max(1.0) as usize;
    let row = (index / side) as f64 - (side as f64 - 1.0) / 2.0;
    let col = (index % side) as f64 - (side as f64 - 1.0) / 2.0;
    LatLng::new(
        CENTER.lat + row * ASSET_SPACING_DEG,
        CENTER.lng + col * ASSET_SPACING_DEG,
    )
}

fn build_sources(config: &Config) -> SourceRegistry {
    let mut sources = SourceRegistry::new();
    match LocalFileSource::new(&config.assets.base_dir, config.assets.worker_threads) {
        Ok(files) => {
            sources.insert(SourceKind::File, Arc::new(files));
        }
        Err(e) => error!("Local file source unavailable: {e}"),
    }

    // Stand-in for the host's network fetcher.
    let web = MemoryFileSource::default();
    web.insert(DEMO_CUBE_URI, DEMO_CUBE.to_vec());
    sources.insert(SourceKind::Web, Arc::new(web));
    sources
}

fn layer_settings(config: &Config) -> LayerSettings {
    let thresholds = LodThresholds::try_custom(config.lod.thresholds.clone()).unwrap_or_else(|| {
        warn!(
            "Invalid LOD thresholds {:?}, using defaults",
            config.lod.thresholds
        );
        LodThresholds::default_contribution()
    });
    LayerSettings {
        thresholds,
        clip_border: config.lod.clip_border,
        debug_clip_border: config.lod.debug_clip_border,
        visualize_frustum_culling: config.debug.visualize_frustum_culling,
    }
}

fn register_assets(layer: &mut MeshAssetLayer, files: &[String]) {
    let database = layer.database_mut();
    if files.is_empty() {
        let descriptor =
            AssetDescriptor::from_web(CENTER, DEMO_CUBE_URI, meters_transform(CENTER));
        if let Err(e) = database.register(descriptor) {
            error!("{e}");
        }
        return;
    }
    for (index, uri) in files.iter().enumerate() {
        let position = grid_position(index, files.len());
        let descriptor =
            AssetDescriptor::from_file(position, uri.as_str(), meters_transform(position));
        if let Err(e) = database.register(descriptor) {
            warn!("Skipping {uri}: {e}");
        }
    }
}

fn log_frame(frame: u32, zoom: f64, plan: &FramePlan, level_count: usize) {
    info!(
        "frame {frame:>4} zoom {zoom:>5.2}: {} visible {:?}, culled {} outside / {} too small",
        plan.visible_count(),
        plan.level_histogram(level_count),
        plan.culled_outside,
        plan.culled_too_small
    );
}

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    terra_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let retry = RetryPolicy {
        max_attempts: config.assets.max_load_attempts,
        backoff_ticks: config.assets.retry_backoff_ticks,
        max_backoff_ticks: config.assets.max_backoff_ticks,
    };
    let database = AssetDatabase::new(build_sources(&config), retry);
    let settings = layer_settings(&config);
    let level_count = settings.thresholds.level_count();
    let mut layer = MeshAssetLayer::new(database, settings);
    register_assets(&mut layer, &args.assets);

    info!(
        "Streaming {} asset(s) from {} for {} frames",
        layer.database().len(),
        config.assets.base_dir.display(),
        args.frames
    );

    let mut last = FramePlan::default();
    for frame in 0..args.frames {
        let zoom = args.zoom - f64::from(frame) * ZOOM_OUT_PER_FRAME;
        last = layer.plan_frame(&view_at(CENTER, zoom));
        if frame % 10 == 0 {
            log_frame(frame, zoom, &last, level_count);
        }
        std::thread::sleep(FRAME_TIME);
    }

    info!(
        "Done: {} drawn, {} culled, {} still loading",
        last.visible_count(),
        last.culled_count(),
        layer.database().loading_count()
    );
}
