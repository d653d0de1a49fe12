//! Geographic placement: zoom scale, Web Mercator plane projection, and model transforms.

use glam::{DMat4, DVec2, DVec3};
use terra_math::LatLng;

/// Edge length of one tile at zoom 0, in plane units.
pub const TILE_SIZE: f64 = 512.0;

/// Latitude limit of the Web Mercator square, in degrees.
pub const LATITUDE_MAX: f64 = 85.051_128_779_806_6;

/// Plane units per unit of model space at `zoom`: `2^zoom`.
pub fn zoom_scale(zoom: f64) -> f64 {
    2f64.powf(zoom)
}

/// Maps geographic positions onto the render plane.
pub trait PlanarProjection {
    /// Project `position` into a plane of `TILE_SIZE * scale` units per side.
    fn project(&self, position: LatLng, scale: f64) -> DVec2;
}

/// Spherical Web Mercator with the origin at the north-west corner and y
/// growing southwards.
#[derive(Clone, Copy, Debug, Default)]
pub struct WebMercator;

impl PlanarProjection for WebMercator {
    fn project(&self, position: LatLng, scale: f64) -> DVec2 {
        let world_size = TILE_SIZE * scale;
        let lat = position.lat.clamp(-LATITUDE_MAX, LATITUDE_MAX);
        let x = 180.0 + position.lng;
        let y = 180.0
            - (std::f64::consts::FRAC_PI_4 + lat.to_radians() / 2.0)
                .tan()
                .ln()
                .to_degrees();
        DVec2::new(x, y) * world_size / 360.0
    }
}

/// Per-frame camera state supplied by the render host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewParams {
    pub projection: DMat4,
    pub zoom: f64,
}

/// Model transform of an asset: translate to its projected position, then
/// apply `local_transform` scaled uniformly by the zoom scale.
pub fn model_transform(
    projection: &impl PlanarProjection,
    position: LatLng,
    local_transform: &DMat4,
    zoom: f64,
) -> DMat4 {
    let scale = zoom_scale(zoom);
    let point = projection.project(position, scale);
    DMat4::from_translation(DVec3::new(point.x, point.y, 0.0))
        * *local_transform
        * DMat4::from_scale(DVec3::splat(scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec4;

    fn approx(a: DVec2, b: DVec2) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn test_zoom_scale() {
        assert_eq!(zoom_scale(0.0), 1.0);
        assert_eq!(zoom_scale(3.0), 8.0);
        assert!((zoom_scale(0.5) - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_null_island_is_plane_center() {
        let p = WebMercator.project(LatLng::new(0.0, 0.0), 1.0);
        assert!(approx(p, DVec2::splat(256.0)));
    }

    #[test]
    fn test_plane_corners() {
        let nw = WebMercator.project(LatLng::new(LATITUDE_MAX, -180.0), 1.0);
        let se = WebMercator.project(LatLng::new(-LATITUDE_MAX, 180.0), 1.0);
        assert!(approx(nw, DVec2::ZERO));
        assert!(approx(se, DVec2::splat(512.0)));
    }

    #[test]
    fn test_latitude_is_clamped() {
        let pole = WebMercator.project(LatLng::new(90.0, 0.0), 1.0);
        let limit = WebMercator.project(LatLng::new(LATITUDE_MAX, 0.0), 1.0);
        assert!(approx(pole, limit));
    }

    #[test]
    fn test_projection_scales_with_zoom() {
        let pos = LatLng::new(60.17, 24.94);
        let z0 = WebMercator.project(pos, zoom_scale(0.0));
        let z4 = WebMercator.project(pos, zoom_scale(4.0));
        assert!(approx(z4, z0 * 16.0));
    }

    /// The model origin lands on the projected point and model units are
    /// scaled by `2^zoom`.
    #[test]
    fn test_model_transform_places_and_scales() {
        let pos = LatLng::new(0.0, 0.0);
        let model = model_transform(&WebMercator, pos, &DMat4::IDENTITY, 2.0);

        let origin = model * DVec4::new(0.0, 0.0, 0.0, 1.0);
        assert!(approx(origin.truncate().truncate(), DVec2::splat(1024.0)));

        let unit_x = model * DVec4::new(1.0, 0.0, 0.0, 1.0);
        assert!((unit_x.x - origin.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_local_transform_applies_before_placement() {
        let local = DMat4::from_translation(DVec3::new(1.0, 0.0, 0.0));
        let model = model_transform(&WebMercator, LatLng::new(0.0, 0.0), &local, 0.0);
        let origin = model * DVec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((origin.x - 257.0).abs() < 1e-9);
    }
}
