use crate::algorithm::config::ZoomConfig;
use crate::algorithm::simplify::TimedPoint;
use crate::models::events::NormalizedPoint;

/// Raw click on the recording clock.
#[derive(Debug, Clone, Copy)]
pub struct ClickSample {
    pub ts: f64,
    pub position: NormalizedPoint,
}

/// Run of clicks close enough in time and space to act as one intent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedClick {
    /// First click's position — the zoom target.
    pub position: NormalizedPoint,
    pub ts: f64,
    pub last_position: NormalizedPoint,
    pub last_ts: f64,
    pub count: usize,
    /// First→last spread; drives the post-zoom pan decision.
    pub internal_distance: f64,
}

impl MergedClick {
    fn from_group(group: &[ClickSample]) -> Self {
        let first = group[0];
        let last = group[group.len() - 1];
        Self {
            position: first.position,
            ts: first.ts,
            last_position: last.position,
            last_ts: last.ts,
            count: group.len(),
            internal_distance: first.position.distance_to(last.position),
        }
    }
}

/// Sequential clustering: a click joins the open group iff it lands within
/// `click_merge_time` of the previous click AND within the pixel merge
/// radius converted to normalized units via the reference frame's larger
/// dimension.
pub fn merge_clicks(
    clicks: &[ClickSample],
    frame_width: u32,
    frame_height: u32,
    config: &ZoomConfig,
) -> Vec<MergedClick> {
    if clicks.is_empty() {
        return Vec::new();
    }

    let frame_side = frame_width.max(frame_height).max(1) as f64;
    let merge_distance = config.click_merge_distance_px / frame_side;

    let mut merged = Vec::new();
    let mut group: Vec<ClickSample> = vec![clicks[0]];

    for &click in &clicks[1..] {
        let previous = group[group.len() - 1];
        let close_in_time = click.ts - previous.ts < config.click_merge_time;
        let close_in_space = click.position.distance_to(previous.position) < merge_distance;

        if close_in_time && close_in_space {
            group.push(click);
        } else {
            merged.push(MergedClick::from_group(&group));
            group = vec![click];
        }
    }
    merged.push(MergedClick::from_group(&group));

    merged
}

/// Detected cursor-follow window after a click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowPattern {
    /// When qualifying movement was first seen.
    pub start_ts: f64,
    /// When the camera should stop following.
    pub until: f64,
}

/// Looks for sustained cursor movement right after a click. Returns a
/// follow window if the cursor leaves `follow_min_move_distance` of the
/// click within `follow_detection_window`.
pub fn detect_click_then_move(
    click: &MergedClick,
    moves: &[TimedPoint],
    next_click_ts: Option<f64>,
    config: &ZoomConfig,
) -> Option<FollowPattern> {
    let mut cap = click.ts + config.follow_max_duration;
    if let Some(next) = next_click_ts {
        cap = cap.min(next);
    }
    let detection_end = (click.last_ts + config.follow_detection_window).min(cap);

    let origin = click.last_position;
    let mut first_qualifying: Option<f64> = None;
    let mut last_qualifying: Option<f64> = None;

    for sample in moves {
        if sample.ts <= click.last_ts {
            continue;
        }
        if sample.ts >= cap {
            break;
        }
        if origin.distance_to(sample.pos()) < config.follow_min_move_distance {
            continue;
        }
        if first_qualifying.is_none() {
            if sample.ts > detection_end {
                // Movement started too late for this pattern; late-follow
                // detection handles it instead.
                return None;
            }
            first_qualifying = Some(sample.ts);
        }
        last_qualifying = Some(sample.ts);
    }

    let start_ts = first_qualifying?;
    let until = (last_qualifying.unwrap_or(start_ts) + config.follow_tail).min(cap);
    Some(FollowPattern { start_ts, until })
}

/// Same qualification test, but scanning an already-scheduled hold for
/// movement that starts after the initial detection window. Keeps the
/// camera from staying locked to a stale position.
pub fn detect_late_follow(
    hold_start: f64,
    hold_end: f64,
    center: NormalizedPoint,
    moves: &[TimedPoint],
    config: &ZoomConfig,
) -> Option<FollowPattern> {
    let scan_start = hold_start + config.follow_detection_window;
    if scan_start >= hold_end {
        return None;
    }

    let mut first_qualifying: Option<f64> = None;
    let mut last_qualifying: Option<f64> = None;

    for sample in moves {
        if sample.ts <= scan_start {
            continue;
        }
        if sample.ts >= hold_end {
            break;
        }
        if center.distance_to(sample.pos()) < config.follow_min_move_distance {
            continue;
        }
        first_qualifying.get_or_insert(sample.ts);
        last_qualifying = Some(sample.ts);
    }

    let start_ts = first_qualifying?;
    let until = (last_qualifying.unwrap_or(start_ts) + config.follow_tail).min(hold_end);
    Some(FollowPattern { start_ts, until })
}
