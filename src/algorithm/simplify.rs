use crate::models::events::NormalizedPoint;

/// Cursor sample on the recording clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub ts: f64,
    pub x: f64,
    pub y: f64,
}

impl TimedPoint {
    pub fn new(ts: f64, x: f64, y: f64) -> Self {
        Self { ts, x, y }
    }

    pub fn from_point(ts: f64, point: NormalizedPoint) -> Self {
        Self {
            ts,
            x: point.x,
            y: point.y,
        }
    }

    pub fn pos(self) -> NormalizedPoint {
        NormalizedPoint::new(self.x, self.y)
    }
}

/// Ramer-Douglas-Peucker reduction of a cursor path. Endpoints always
/// survive; two or fewer points pass through unchanged.
pub fn simplify(points: &[TimedPoint], epsilon: f64) -> Vec<TimedPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[points.len() - 1] = true;
    simplify_range(points, 0, points.len() - 1, epsilon.max(0.0), &mut keep);

    points
        .iter()
        .zip(keep)
        .filter_map(|(point, kept)| kept.then_some(*point))
        .collect()
}

fn simplify_range(points: &[TimedPoint], start: usize, end: usize, epsilon: f64, keep: &mut [bool]) {
    if end <= start + 1 {
        return;
    }

    let mut max_distance = 0.0;
    let mut max_index = start;
    for i in start + 1..end {
        let distance = perpendicular_distance(points[i], points[start], points[end]);
        if distance > max_distance {
            max_distance = distance;
            max_index = i;
        }
    }

    if max_distance > epsilon {
        keep[max_index] = true;
        simplify_range(points, start, max_index, epsilon, keep);
        simplify_range(points, max_index, end, epsilon, keep);
    }
}

fn perpendicular_distance(point: TimedPoint, line_start: TimedPoint, line_end: TimedPoint) -> f64 {
    let dx = line_end.x - line_start.x;
    let dy = line_end.y - line_start.y;
    let length = dx.hypot(dy);

    // Degenerate segment: fall back to point distance.
    if length < 1e-12 {
        return (point.x - line_start.x).hypot(point.y - line_start.y);
    }

    ((point.x - line_start.x) * dy - (point.y - line_start.y) * dx).abs() / length
}

/// Re-inserts raw samples wherever simplification left a time gap larger
/// than `max_gap`. RDP alone can leave slow, near-linear motion represented
/// by two distant points; this restores a responsiveness floor.
pub fn densify(simplified: &[TimedPoint], raw: &[TimedPoint], max_gap: f64) -> Vec<TimedPoint> {
    if simplified.len() < 2 || raw.is_empty() || max_gap <= 0.0 {
        return simplified.to_vec();
    }

    let mut out = simplified.to_vec();
    for pair in simplified.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        if b.ts - a.ts <= max_gap {
            continue;
        }

        let mut synthetic_ts = a.ts + max_gap;
        while synthetic_ts < b.ts {
            if let Some(sample) = nearest_raw_between(raw, synthetic_ts, a.ts, b.ts) {
                out.push(sample);
            }
            synthetic_ts += max_gap;
        }
    }

    out.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    out.dedup_by(|a, b| (a.ts - b.ts).abs() < 1e-9);
    out
}

fn nearest_raw_between(raw: &[TimedPoint], target_ts: f64, after: f64, before: f64) -> Option<TimedPoint> {
    raw.iter()
        .filter(|sample| sample.ts > after && sample.ts < before)
        .min_by(|a, b| (a.ts - target_ts).abs().total_cmp(&(b.ts - target_ts).abs()))
        .copied()
}
