use glam::{DMat4, Vec3};
use terra_lod::CullReason;

/// One mesh to draw this frame.
#[derive(Clone, Debug, PartialEq)]
pub struct DrawItem {
    pub uri: String,
    /// `projection * model`, ready for the vertex stage.
    pub world_view_projection: DMat4,
    pub level: u8,
    /// Debug tint for `level`.
    pub color: Vec3,
    pub index_count: usize,
}

/// Result of one [`MeshAssetLayer::plan_frame`](crate::MeshAssetLayer::plan_frame) call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FramePlan {
    pub draws: Vec<DrawItem>,
    pub culled_outside: usize,
    pub culled_too_small: usize,
}

impl FramePlan {
    pub(crate) fn record_cull(&mut self, reason: CullReason) {
        match reason {
            CullReason::OutsideFrustum => self.culled_outside += 1,
            CullReason::TooSmall => self.culled_too_small += 1,
        }
    }

    pub fn visible_count(&self) -> usize {
        self.draws.len()
    }

    pub fn culled_count(&self) -> usize {
        self.culled_outside + self.culled_too_small
    }

    /// Number of draws at each level in `0..level_count`. Draws at higher
    /// levels are counted in the last bucket.
    pub fn level_histogram(&self, level_count: usize) -> Vec<usize> {
        let mut histogram = vec![0; level_count.max(1)];
        let last = histogram.len() - 1;
        for draw in &self.draws {
            histogram[usize::from(draw.level).min(last)] += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw(level: u8) -> DrawItem {
        DrawItem {
            uri: format!("lod{level}.obj"),
            world_view_projection: DMat4::IDENTITY,
            level,
            color: terra_lod::lod_color(level),
            index_count: 3,
        }
    }

    #[test]
    fn test_counts() {
        let mut plan = FramePlan {
            draws: vec![draw(0), draw(2)],
            ..Default::default()
        };
        plan.record_cull(CullReason::OutsideFrustum);
        plan.record_cull(CullReason::TooSmall);
        plan.record_cull(CullReason::TooSmall);
        assert_eq!(plan.visible_count(), 2);
        assert_eq!(plan.culled_outside, 1);
        assert_eq!(plan.culled_too_small, 2);
        assert_eq!(plan.culled_count(), 3);
    }

    #[test]
    fn test_level_histogram() {
        let plan = FramePlan {
            draws: vec![draw(0), draw(0), draw(1), draw(9)],
            ..Default::default()
        };
        assert_eq!(plan.level_histogram(3), vec![2, 1, 1]);
        assert_eq!(plan.level_histogram(0), vec![4]);
    }
}
