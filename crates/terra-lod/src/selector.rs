//! Frustum rejection and screen-contribution LOD selection.

use glam::DMat4;
use terra_math::{Bounds3, ClipBounds, project_to_clip_space};

/// Clip-space border used for frustum rejection.
pub const DEFAULT_CLIP_BORDER: f64 = 1.0;

/// Tighter border that makes culling visible on screen while debugging.
pub const DEBUG_CLIP_BORDER: f64 = 0.75;

/// Screen-contribution boundaries between detail levels.
#[derive(Clone, Debug, PartialEq)]
pub struct LodThresholds {
    /// `thresholds[i]` is the smallest contribution drawn at level `i`.
    /// Strictly decreasing; anything below the last value is culled.
    thresholds: Vec<f64>,
}

impl LodThresholds {
    /// Six levels: 0.3, 0.1, 0.05, 0.03, 0.01, 0.005.
    pub fn default_contribution() -> Self {
        Self {
            thresholds: vec![0.3, 0.1, 0.05, 0.03, 0.01, 0.005],
        }
    }

    /// Create custom thresholds.
    ///
    /// # Panics
    ///
    /// Panics if thresholds are empty or longer than 255, not strictly
    /// decreasing, or contain non-positive values.
    pub fn custom(thresholds: Vec<f64>) -> Self {
        assert!(!thresholds.is_empty(), "must have at least one threshold");
        assert!(
            thresholds.len() <= usize::from(u8::MAX),
            "at most 255 thresholds"
        );
        for (i, &t) in thresholds.iter().enumerate() {
            assert!(t > 0.0, "thresholds must be positive");
            if i > 0 {
                assert!(
                    t < thresholds[i - 1],
                    "thresholds must be strictly decreasing"
                );
            }
        }
        Self { thresholds }
    }

    /// Non-panicking variant of [`custom`](Self::custom) for values read from
    /// configuration.
    pub fn try_custom(thresholds: Vec<f64>) -> Option<Self> {
        let valid = !thresholds.is_empty()
            && thresholds.iter().all(|&t| t > 0.0)
            && thresholds.windows(2).all(|w| w[1] < w[0])
            && thresholds.len() <= usize::from(u8::MAX);
        valid.then_some(Self { thresholds })
    }

    pub fn level_count(&self) -> usize {
        self.thresholds.len()
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }
}

impl Default for LodThresholds {
    fn default() -> Self {
        Self::default_contribution()
    }
}

/// Why an asset is not drawn this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CullReason {
    /// The projected box lies entirely past the clip border on some axis.
    OutsideFrustum,
    /// The projected box is smaller than the last threshold.
    TooSmall,
}

/// Per-frame verdict for one asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LodDecision {
    Culled(CullReason),
    /// Draw at this level; 0 is the finest.
    Visible(u8),
}

impl LodDecision {
    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible(_))
    }

    pub fn level(&self) -> Option<u8> {
        match self {
            Self::Visible(level) => Some(*level),
            Self::Culled(_) => None,
        }
    }
}

/// Stateless culling and level selection from clip-space extents.
#[derive(Clone, Debug)]
pub struct LodSelector {
    thresholds: LodThresholds,
    clip_border: f64,
}

impl LodSelector {
    pub fn new(thresholds: LodThresholds, clip_border: f64) -> Self {
        Self {
            thresholds,
            clip_border,
        }
    }

    /// True when the box is entirely beyond the border on x or on y.
    pub fn is_outside(&self, clip: &ClipBounds) -> bool {
        let border = self.clip_border;
        clip.max.x < -border || clip.min.x > border || clip.max.y < -border || clip.min.y > border
    }

    /// Half of the smaller clip-space extent. Clip space spans 2 units per
    /// axis, so this is the fraction of the viewport covered on that axis.
    pub fn contribution(clip: &ClipBounds) -> f64 {
        (0.5 * clip.width()).min(0.5 * clip.height())
    }

    /// Index of the first threshold met by `contribution`, or `None` when it
    /// falls below all of them.
    pub fn select_level(&self, contribution: f64) -> Option<u8> {
        self.thresholds
            .thresholds
            .iter()
            .position(|&threshold| contribution >= threshold)
            .and_then(|i| u8::try_from(i).ok())
    }

    pub fn decide(&self, clip: &ClipBounds) -> LodDecision {
        if self.is_outside(clip) {
            return LodDecision::Culled(CullReason::OutsideFrustum);
        }
        match self.select_level(Self::contribution(clip)) {
            Some(level) => LodDecision::Visible(level),
            None => LodDecision::Culled(CullReason::TooSmall),
        }
    }

    /// Project `bounds` through `world_view_projection` and decide.
    pub fn evaluate(&self, bounds: &Bounds3, world_view_projection: &DMat4) -> LodDecision {
        self.decide(&project_to_clip_space(bounds, world_view_projection))
    }

    pub fn thresholds(&self) -> &LodThresholds {
        &self.thresholds
    }

    pub fn clip_border(&self) -> f64 {
        self.clip_border
    }
}

impl Default for LodSelector {
    fn default() -> Self {
        Self::new(LodThresholds::default_contribution(), DEFAULT_CLIP_BORDER)
    }
}
