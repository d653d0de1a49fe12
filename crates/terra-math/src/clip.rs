//! Clip-space projection of bounding boxes.
//!
//! The projected rectangle is the 2D bounding box of the eight transformed
//! corners. It is an approximation of the true screen footprint (the convex
//! hull of the projected box), and it is never tighter than the hull, which
//! keeps culling against it conservative.

use glam::{DMat4, DVec2, DVec4};

use crate::Bounds3;

/// Axis-aligned rectangle in clip space (x, y after perspective division).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClipBounds {
    pub min: DVec2,
    pub max: DVec2,
}

impl ClipBounds {
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Self { min, max }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// Project all eight corners of `bounds` through `transform` and return the
/// x/y extent of the result.
///
/// Perspective division happens only when `w != 0`; a corner with `w == 0`
/// keeps its raw x and y instead of producing infinities.
pub fn project_to_clip_space(bounds: &Bounds3, transform: &DMat4) -> ClipBounds {
    let mut min = DVec2::splat(f64::MAX);
    let mut max = DVec2::splat(-f64::MAX);

    for corner in bounds.corners() {
        let clip = *transform * DVec4::from((corner.as_dvec3(), 1.0));
        let mut xy = DVec2::new(clip.x, clip.y);
        if clip.w != 0.0 {
            xy /= clip.w;
        }
        min = min.min(xy);
        max = max.max(xy);
    }

    ClipBounds { min, max }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{DVec3, Vec3};

    fn unit_box() -> Bounds3 {
        Bounds3::new(Vec3::splat(-1.0), Vec3::splat(1.0))
    }

    #[test]
    fn test_identity_keeps_xy_extent() {
        let clip = project_to_clip_space(&unit_box(), &DMat4::IDENTITY);
        assert_eq!(clip.min, DVec2::new(-1.0, -1.0));
        assert_eq!(clip.max, DVec2::new(1.0, 1.0));
        assert_eq!(clip.width(), 2.0);
        assert_eq!(clip.height(), 2.0);
    }

    #[test]
    fn test_translation_and_scale() {
        let transform = DMat4::from_translation(DVec3::new(10.0, -5.0, 0.0))
            * DMat4::from_scale(DVec3::splat(0.5));
        let clip = project_to_clip_space(&unit_box(), &transform);
        assert_eq!(clip.min, DVec2::new(9.5, -5.5));
        assert_eq!(clip.max, DVec2::new(10.5, -4.5));
    }

    /// w = 2 everywhere halves the extent.
    #[test]
    fn test_perspective_division() {
        let mut transform = DMat4::IDENTITY;
        transform.w_axis.w = 2.0;
        let clip = project_to_clip_space(&unit_box(), &transform);
        assert_eq!(clip.min, DVec2::new(-0.5, -0.5));
        assert_eq!(clip.max, DVec2::new(0.5, 0.5));
    }

    /// A transform producing w = 0 keeps the raw coordinates rather than
    /// dividing by zero.
    #[test]
    fn test_zero_w_skips_division() {
        let mut transform = DMat4::IDENTITY;
        transform.w_axis.w = 0.0;
        let clip = project_to_clip_space(&unit_box(), &transform);
        assert!(clip.min.is_finite() && clip.max.is_finite());
        assert_eq!(clip.min, DVec2::new(-1.0, -1.0));
        assert_eq!(clip.max, DVec2::new(1.0, 1.0));
    }

    /// The corner box of a rotated cube is at least as large as the cube's
    /// own projection.
    #[test]
    fn test_rotation_is_conservative() {
        let transform = DMat4::from_rotation_z(std::f64::consts::FRAC_PI_4);
        let clip = project_to_clip_space(&unit_box(), &transform);
        let half_diag = 2.0_f64.sqrt();
        assert!((clip.max.x - half_diag).abs() < 1e-9);
        assert!((clip.min.y + half_diag).abs() < 1e-9);
    }
}
