use crate::models::events::NormalizedPoint;

/// Fraction of the half-extent past which the corrective pass kicks in.
const HARD_VISIBILITY_RATIO: f64 = 0.98;

/// Picks the camera center closest to `desired` that keeps the whole
/// viewport inside [0,1]² at `scale` and keeps `visible` within
/// `(1 - margin)` of the viewport half-extent from center.
///
/// The two constraints are per-axis intervals; their intersection may be
/// empty in an extreme corner, in which case the valid-range boundary
/// nearest the target wins and a final corrective nudge guarantees the
/// target stays inside ~98% of the half-extent.
pub fn constrain_center(
    desired: NormalizedPoint,
    scale: f64,
    visible: NormalizedPoint,
    margin: f64,
) -> NormalizedPoint {
    NormalizedPoint::new(
        constrain_axis(desired.x, scale, visible.x, margin),
        constrain_axis(desired.y, scale, visible.y, margin),
    )
}

fn constrain_axis(desired: f64, scale: f64, target: f64, margin: f64) -> f64 {
    if scale <= 1.0 {
        // At no zoom the viewport is the whole screen.
        return 0.5;
    }

    let half = 1.0 / (2.0 * scale);
    let valid_low = half;
    let valid_high = 1.0 - half;

    let reach = half * (1.0 - margin.clamp(0.0, 0.9));
    let visible_low = target - reach;
    let visible_high = target + reach;

    let low = valid_low.max(visible_low);
    let high = valid_high.min(visible_high);

    let mut center = if low <= high {
        desired.clamp(low, high)
    } else {
        target.clamp(valid_low, valid_high)
    };

    // Corrective pass for pathological corners.
    let hard_limit = half * HARD_VISIBILITY_RATIO;
    let offset = target - center;
    if offset.abs() > hard_limit {
        center = (target - hard_limit.copysign(offset)).clamp(valid_low, valid_high);
    }

    center
}
