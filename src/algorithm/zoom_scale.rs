use crate::models::events::NormalizedPoint;

/// Extra magnification for focus points near screen edges. After boundary
/// clamping, edge content sits off-center and reads smaller at equal zoom,
/// so edges earn a boost. The curve itself is a tuning policy.
pub trait CornerBoost {
    /// Additive scale boost for a focus point; 0.0 at screen center.
    fn boost(&self, at: NormalizedPoint) -> f64;
}

/// Quadratic ramp in Chebyshev distance from center: no boost at the
/// center, full `strength` at a corner.
#[derive(Debug, Clone, Copy)]
pub struct EdgeDistanceBoost {
    pub strength: f64,
}

impl CornerBoost for EdgeDistanceBoost {
    fn boost(&self, at: NormalizedPoint) -> f64 {
        let dx = (at.x - 0.5).abs();
        let dy = (at.y - 0.5).abs();
        let edge = (dx.max(dy) / 0.5).clamp(0.0, 1.0);
        self.strength.max(0.0) * edge * edge
    }
}

pub struct DynamicZoomCalculator {
    base_scale: f64,
    min_scale: f64,
    max_scale: f64,
    boost: Box<dyn CornerBoost + Send + Sync>,
}

impl DynamicZoomCalculator {
    pub fn new(base_scale: f64, min_scale: f64, max_scale: f64, boost_strength: f64) -> Self {
        Self::with_boost(
            base_scale,
            min_scale,
            max_scale,
            Box::new(EdgeDistanceBoost {
                strength: boost_strength,
            }),
        )
    }

    pub fn with_boost(
        base_scale: f64,
        min_scale: f64,
        max_scale: f64,
        boost: Box<dyn CornerBoost + Send + Sync>,
    ) -> Self {
        let min_scale = min_scale.max(1.0);
        Self {
            base_scale: base_scale.max(min_scale),
            min_scale,
            max_scale: max_scale.max(min_scale),
            boost,
        }
    }

    /// Effective zoom for a focus point: base scale plus corner boost,
    /// clamped to the configured range.
    pub fn scale_with_corner_boost(&self, at: NormalizedPoint) -> f64 {
        (self.base_scale + self.boost.boost(at)).clamp(self.min_scale, self.max_scale)
    }
}
