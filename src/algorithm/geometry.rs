use crate::models::events::NormalizedPoint;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn lerp_point(a: NormalizedPoint, b: NormalizedPoint, t: f64) -> NormalizedPoint {
    NormalizedPoint::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Hermite smoothstep over [0, 1]; clamps outside the interval.
pub fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
