use crate::algorithm::bounds::constrain_center;
use crate::algorithm::config::ZoomConfig;
use crate::algorithm::geometry::smoothstep;
use crate::algorithm::one_euro::OneEuroFilter2;
use crate::algorithm::simplify::{densify, simplify, TimedPoint};
use crate::algorithm::spring::ChaseSpring;
use crate::models::events::NormalizedPoint;
use crate::models::timeline::{Easing, ZoomKeyframe};

/// Generates the keyframes for a follow segment: the camera chases the
/// smoothed cursor instead of holding a fixed center.
///
/// Pipeline per output tick: smoothstep-blended raw target → One Euro pass
/// → spring chase integration → visibility constraint. The dense track is
/// then thinned by RDP and re-densified to cap keyframe gaps.
pub fn generate_follow_keyframes(
    start: NormalizedPoint,
    scale: f64,
    start_ts: f64,
    end_ts: f64,
    moves: &[TimedPoint],
    config: &ZoomConfig,
) -> Vec<ZoomKeyframe> {
    let interval = config.follow_keyframe_interval;
    if end_ts - start_ts < interval {
        return Vec::new();
    }

    // Filters are created fresh per segment and never shared.
    let mut filter = OneEuroFilter2::new(
        config.follow_min_cutoff,
        config.follow_beta,
        config.follow_d_cutoff,
    );
    let damping =
        ChaseSpring::critical_damping(config.follow_spring_stiffness, config.follow_spring_mass);
    let mut spring_x = ChaseSpring::new(
        start.x,
        config.follow_spring_stiffness,
        damping,
        config.follow_spring_mass,
    );
    let mut spring_y = ChaseSpring::new(
        start.y,
        config.follow_spring_stiffness,
        damping,
        config.follow_spring_mass,
    );

    let mut track: Vec<TimedPoint> = Vec::new();
    let mut ts = start_ts;
    while ts <= end_ts + 1e-9 {
        let cursor = cursor_at(moves, ts).unwrap_or(start);
        let smoothed = filter.filter(cursor, ts);

        spring_x.target = smoothed.x;
        spring_y.target = smoothed.y;
        let chased = NormalizedPoint::new(spring_x.tick(interval), spring_y.tick(interval));

        let center = constrain_center(chased, scale, cursor, config.visibility_margin);
        track.push(TimedPoint::from_point(ts, center));

        ts += interval;
    }

    let reduced = simplify(&track, config.rdp_epsilon);
    let reduced = densify(&reduced, &track, config.follow_max_keyframe_gap);

    reduced
        .into_iter()
        .map(|point| ZoomKeyframe::new(point.ts, scale, point.pos(), Easing::Linear))
        .collect()
}

/// Cursor position at `ts`, smoothstep-blended between the bracketing raw
/// samples; clamps to the first/last sample outside the recorded range.
fn cursor_at(moves: &[TimedPoint], ts: f64) -> Option<NormalizedPoint> {
    let first = moves.first()?;
    if ts <= first.ts {
        return Some(first.pos());
    }
    let last = moves[moves.len() - 1];
    if ts >= last.ts {
        return Some(last.pos());
    }

    let next_idx = moves.partition_point(|sample| sample.ts <= ts);
    let before = moves[next_idx - 1];
    let after = moves[next_idx];

    let span = after.ts - before.ts;
    if span <= 1e-9 {
        return Some(before.pos());
    }
    let blend = smoothstep((ts - before.ts) / span);
    Some(NormalizedPoint::new(
        before.x + (after.x - before.x) * blend,
        before.y + (after.y - before.y) * blend,
    ))
}
