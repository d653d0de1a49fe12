//! Debug colors used to visualize the selected detail level.

use glam::Vec3;

/// One color per default detail level, green (finest) to red (coarsest).
pub const LOD_COLORS: [Vec3; 6] = [
    Vec3::new(0.0, 0.75, 0.0),
    Vec3::new(0.3, 0.75, 0.0),
    Vec3::new(0.6, 0.75, 0.0),
    Vec3::new(0.75, 0.75, 0.0),
    Vec3::new(0.75, 0.4, 0.0),
    Vec3::new(0.75, 0.2, 0.0),
];

/// Color for `level`. Levels past the palette reuse the coarsest color.
pub fn lod_color(level: u8) -> Vec3 {
    LOD_COLORS[usize::from(level).min(LOD_COLORS.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finest_is_green() {
        assert_eq!(lod_color(0), Vec3::new(0.0, 0.75, 0.0));
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(lod_color(5), lod_color(200));
    }
}
