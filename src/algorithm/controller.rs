use crate::algorithm::bounds::constrain_center;
use crate::algorithm::clicks::{
    detect_click_then_move, detect_late_follow, merge_clicks, ClickSample, MergedClick,
};
use crate::algorithm::config::{ConfigError, ZoomConfig};
use crate::algorithm::follow::generate_follow_keyframes;
use crate::algorithm::geometry::{lerp, lerp_point};
use crate::algorithm::one_euro::OneEuroFilter2;
use crate::algorithm::simplify::TimedPoint;
use crate::algorithm::spring::SpringAnimation;
use crate::algorithm::zoom_scale::DynamicZoomCalculator;
use crate::models::events::{EventsFile, InputEvent, NormalizedPoint};
use crate::models::timeline::{Easing, ZoomKeyframe, ZoomTimeline, MIN_KEYFRAME_SPACING};

/// How far before a vetoing click the zoom-out starts.
const VETO_LEAD: f64 = 0.1;

/// Generator phase between two merged clicks. Lives only for the duration
/// of one generation pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GeneratorState {
    Idle,
    ZoomingIn(NormalizedPoint),
    Zoomed(NormalizedPoint),
    Following(NormalizedPoint),
    ZoomingOut(NormalizedPoint),
    Transitioning {
        from: NormalizedPoint,
        to: NormalizedPoint,
    },
}

/// A zoom-out that has been appended to the keyframe list but may still be
/// cancelled by a click landing inside its window.
#[derive(Debug, Clone, Copy)]
struct PendingZoomOut {
    start: f64,
    end: f64,
    origin_center: NormalizedPoint,
    origin_scale: f64,
    keyframe_start: usize,
    keyframe_len: usize,
}

/// Single-pass state machine turning merged clicks into camera keyframes.
///
/// Created fresh per generation call; owns all intermediate state and is
/// discarded once the keyframe list is produced.
pub struct ContinuousZoomController<'a> {
    config: &'a ZoomConfig,
    calculator: DynamicZoomCalculator,
    moves: &'a [TimedPoint],
    key_downs: &'a [f64],
    duration: f64,

    keyframes: Vec<ZoomKeyframe>,
    state: GeneratorState,
    /// When the in-flight transition lands on the timeline.
    settle_ts: f64,
    current_center: NormalizedPoint,
    current_scale: f64,
    last_activity: f64,
    hold_start: f64,
    hold_end: f64,
    pending_zoom_out: Option<PendingZoomOut>,
    recent_clicks: Vec<ClickSample>,
}

impl<'a> ContinuousZoomController<'a> {
    pub fn new(
        config: &'a ZoomConfig,
        moves: &'a [TimedPoint],
        key_downs: &'a [f64],
        duration: f64,
    ) -> Self {
        Self {
            config,
            calculator: DynamicZoomCalculator::new(
                config.base_zoom_scale,
                config.min_zoom_scale,
                config.max_zoom_scale,
                config.corner_boost_strength,
            ),
            moves,
            key_downs,
            duration: duration.max(0.0),
            keyframes: Vec::new(),
            state: GeneratorState::Idle,
            settle_ts: 0.0,
            current_center: NormalizedPoint::CENTER,
            current_scale: 1.0,
            last_activity: 0.0,
            hold_start: 0.0,
            hold_end: 0.0,
            pending_zoom_out: None,
            recent_clicks: Vec::new(),
        }
    }

    pub fn run(mut self, merged: &[MergedClick]) -> Vec<ZoomKeyframe> {
        self.emit(ZoomKeyframe::neutral(0.0, Easing::Linear));

        for (index, click) in merged.iter().enumerate() {
            let next_click_ts = merged.get(index + 1).map(|next| next.ts);
            self.process_click(click, next_click_ts);
        }

        self.finalize();
        self.keyframes
    }

    fn process_click(&mut self, click: &MergedClick, next_click_ts: Option<f64>) {
        self.commit_transitions(click.ts);

        // 1. Keyboard veto: typing right at the click means the user is
        // working, not pointing; back off instead of re-targeting.
        if self.is_zoomed() && self.key_near(click.ts) {
            log::debug!("keyboard veto at {:.3}s, zooming out", click.ts);
            let start = (click.ts - VETO_LEAD).max(self.last_emit_ts() + MIN_KEYFRAME_SPACING);
            self.schedule_zoom_out(start);
            self.touch(click);
            return;
        }

        // 2. Click inside a scheduled zoom-out window cancels it.
        if let Some(pending) = self.pending_zoom_out {
            if click.ts >= pending.start && click.ts < pending.end {
                self.interrupt_zoom_out(pending, click, next_click_ts);
                self.touch(click);
                return;
            }
        }

        // 3. Idle timeout: the camera should already have pulled back.
        if self.is_zoomed() && click.ts - self.effective_activity(click.ts) > self.config.idle_timeout
        {
            let start = self.effective_activity(click.ts) + self.config.idle_timeout;
            let start = start.max(self.last_emit_ts() + MIN_KEYFRAME_SPACING);
            log::debug!("idle timeout, scheduling zoom-out at {start:.3}s");
            self.schedule_zoom_out(start);

            // The click may land inside the window it just caused.
            if let Some(pending) = self.pending_zoom_out {
                if click.ts < pending.end {
                    self.interrupt_zoom_out(pending, click, next_click_ts);
                    self.touch(click);
                    return;
                }
            }
            self.commit_transitions(click.ts);
        }

        // 4. State-dependent transition.
        match self.state {
            GeneratorState::Idle | GeneratorState::ZoomingOut(_) => {
                self.zoom_in_from_idle(click, next_click_ts);
            }
            GeneratorState::Zoomed(center)
            | GeneratorState::Following(center)
            | GeneratorState::ZoomingIn(center)
            | GeneratorState::Transitioning { to: center, .. } => {
                self.retarget(center, click, next_click_ts);
            }
        }

        // 5. Every click advances the activity clock, even absorbed ones.
        self.touch(click);
    }

    /// Advances transient states whose timeline segments have finished by
    /// `ts`.
    fn commit_transitions(&mut self, ts: f64) {
        if let Some(pending) = self.pending_zoom_out {
            if ts >= pending.end {
                self.pending_zoom_out = None;
                self.state = GeneratorState::Idle;
                self.current_scale = 1.0;
                self.current_center = NormalizedPoint::CENTER;
                return;
            }
        }

        if ts < self.settle_ts {
            return;
        }
        match self.state {
            GeneratorState::ZoomingIn(target)
            | GeneratorState::Transitioning { to: target, .. } => {
                self.state = GeneratorState::Zoomed(target);
            }
            GeneratorState::ZoomingOut(_) if self.pending_zoom_out.is_none() => {
                self.state = GeneratorState::Idle;
                self.current_scale = 1.0;
                self.current_center = NormalizedPoint::CENTER;
            }
            _ => {}
        }
    }

    fn zoom_in_from_idle(&mut self, click: &MergedClick, next_click_ts: Option<f64>) {
        let target_scale = self.calculator.scale_with_corner_boost(click.position);
        let center = self.constrain(click.position, target_scale);

        let mut start = click.ts;
        if self.config.pre_click_buffer_enabled {
            start -= self.config.pre_click_buffer;
        }
        let start = start.max(self.last_emit_ts() + MIN_KEYFRAME_SPACING).max(0.0);
        let zoom_end = start + self.config.zoom_in_duration;

        // Pin the current camera state so the segment before `start` holds.
        self.emit(ZoomKeyframe::new(
            start,
            self.current_scale,
            self.current_center,
            Easing::Linear,
        ));
        self.emit(ZoomKeyframe::new(zoom_end, target_scale, center, self.config.easing));

        self.current_scale = target_scale;
        self.current_center = center;

        if let Some(pattern) = detect_click_then_move(click, self.moves, next_click_ts, self.config)
        {
            // The cursor is already on the move: skip the static hold.
            let follow_end = pattern.until.max(zoom_end + self.config.follow_keyframe_interval);
            self.enter_follow(center, target_scale, zoom_end, follow_end, click, next_click_ts);
            return;
        }

        self.state = GeneratorState::ZoomingIn(center);
        self.settle_ts = zoom_end;

        // A merged run that drifted needs a closing pan to its last click.
        if click.internal_distance > self.config.follow_min_move_distance {
            let pan_center = self.constrain(click.last_position, target_scale);
            let pan_end = zoom_end + self.config.pan_duration;
            self.emit(ZoomKeyframe::new(pan_end, target_scale, pan_center, self.config.easing));
            self.state = GeneratorState::Transitioning {
                from: center,
                to: pan_center,
            };
            self.settle_ts = pan_end;
            self.current_center = pan_center;
        }

        self.set_hold_window(self.settle_ts, click.count, next_click_ts);

        // Movement that starts late in the hold still deserves tracking.
        if let Some(pattern) = detect_late_follow(
            self.hold_start,
            self.hold_end,
            self.current_center,
            self.moves,
            self.config,
        ) {
            let (from, scale) = (self.current_center, self.current_scale);
            self.enter_follow(from, scale, pattern.start_ts, pattern.until, click, next_click_ts);
        }
    }

    fn enter_follow(
        &mut self,
        from: NormalizedPoint,
        scale: f64,
        start_ts: f64,
        end_ts: f64,
        click: &MergedClick,
        next_click_ts: Option<f64>,
    ) {
        let frames = generate_follow_keyframes(from, scale, start_ts, end_ts, self.moves, self.config);
        let final_center = frames.last().map(|frame| frame.center).unwrap_or(from);
        for frame in frames {
            self.emit(frame);
        }

        self.state = GeneratorState::Following(final_center);
        self.settle_ts = end_ts;
        self.current_center = final_center;
        self.current_scale = scale;
        self.set_hold_window(end_ts, click.count, next_click_ts);
    }

    fn retarget(&mut self, center: NormalizedPoint, click: &MergedClick, next_click_ts: Option<f64>) {
        let distance = center.distance_to(click.position);

        if self.debounce_applies(click) {
            log::debug!("debounce absorbed click at {:.3}s", click.ts);
            return;
        }

        let in_early_hold = click.ts < self.hold_start + self.config.hold_min;
        if in_early_hold {
            let hysteresis_distance =
                self.config.large_distance_threshold * self.config.hysteresis_distance_ratio;
            if distance < hysteresis_distance {
                // Near-target click inside the grace period: stay put.
                return;
            }
            log::debug!("dropped early click at {:.3}s (hold not reached)", click.ts);
            return;
        }

        let target_scale = self.calculator.scale_with_corner_boost(click.position);
        let new_center = self.constrain(click.position, target_scale);
        let session_active = self
            .recent_clicks
            .last()
            .is_some_and(|previous| click.ts - previous.ts < self.config.active_session_timeout);

        if distance > self.config.large_distance_threshold && !session_active {
            // Long jump: pull back, glide over, dive back in.
            let intermediate_scale = if distance < 0.5 {
                1.5
            } else if distance < 0.8 {
                1.3
            } else {
                1.0
            };
            let total = self.config.zoom_out_duration * 0.5
                + self.config.pan_duration * (0.5 + distance).min(1.5);
            let mid_ts = click.ts + total * 0.5;
            let end_ts = click.ts + total;
            let mid_center = self.constrain(lerp_point(center, click.position, 0.5), intermediate_scale);

            self.emit_pin(click.ts);
            self.emit(ZoomKeyframe::new(mid_ts, intermediate_scale, mid_center, Easing::EaseIn));
            self.emit(ZoomKeyframe::new(end_ts, target_scale, new_center, Easing::EaseOut));

            self.state = GeneratorState::Transitioning {
                from: center,
                to: new_center,
            };
            self.settle_ts = end_ts;
        } else {
            let end_ts = click.ts + self.config.pan_duration;
            self.emit_pin(click.ts);
            self.emit(ZoomKeyframe::new(end_ts, target_scale, new_center, self.config.easing));

            self.state = GeneratorState::Transitioning {
                from: center,
                to: new_center,
            };
            self.settle_ts = end_ts;
        }

        self.current_center = new_center;
        self.current_scale = target_scale;
        self.set_hold_window(self.settle_ts, click.count, next_click_ts);
    }

    /// Emits a cancellable zoom-out pair and records it as pending.
    fn schedule_zoom_out(&mut self, start: f64) {
        let end = start + self.config.zoom_out_duration;
        let keyframe_start = self.keyframes.len();

        self.emit(ZoomKeyframe::new(
            start,
            self.current_scale,
            self.current_center,
            Easing::Linear,
        ));
        self.emit(ZoomKeyframe::neutral(end, self.config.easing));

        self.pending_zoom_out = Some(PendingZoomOut {
            start,
            end,
            origin_center: self.current_center,
            origin_scale: self.current_scale,
            keyframe_start,
            keyframe_len: self.keyframes.len() - keyframe_start,
        });
        self.state = GeneratorState::ZoomingOut(self.current_center);
        self.settle_ts = end;
    }

    /// Cancels a scheduled zoom-out mid-flight and zooms straight back in
    /// from the interpolated camera state, never passing through neutral.
    fn interrupt_zoom_out(
        &mut self,
        pending: PendingZoomOut,
        click: &MergedClick,
        next_click_ts: Option<f64>,
    ) {
        log::debug!("click at {:.3}s interrupts scheduled zoom-out", click.ts);

        let spring = SpringAnimation::new(self.config.spring, pending.origin_scale, 1.0);
        let progress = spring.progress(click.ts - pending.start).clamp(0.0, 1.0);
        let scale_now = lerp(pending.origin_scale, 1.0, progress);
        let center_now = lerp_point(pending.origin_center, NormalizedPoint::CENTER, progress);
        let center_now = self.constrain(center_now, scale_now);

        self.keyframes
            .drain(pending.keyframe_start..pending.keyframe_start + pending.keyframe_len);
        self.pending_zoom_out = None;

        let target_scale = self.calculator.scale_with_corner_boost(click.position);
        let new_center = self.constrain(click.position, target_scale);
        let end_ts = click.ts + self.config.zoom_in_duration;

        self.emit(ZoomKeyframe::new(click.ts, scale_now, center_now, Easing::Linear));
        self.emit(ZoomKeyframe::new(end_ts, target_scale, new_center, Easing::EaseOut));

        self.state = GeneratorState::ZoomingIn(new_center);
        self.settle_ts = end_ts;
        self.current_scale = target_scale;
        self.current_center = new_center;
        self.set_hold_window(end_ts, click.count, next_click_ts);
    }

    /// Closes the pass: no recording may end mid-zoom.
    fn finalize(&mut self) {
        self.commit_transitions(self.duration);
        if !self.is_zoomed() && !matches!(self.state, GeneratorState::ZoomingIn(_)) {
            return;
        }

        let base = self.effective_activity(self.duration);
        let mut start = (base + self.config.idle_timeout).max(self.hold_end);
        if start + self.config.zoom_out_duration > self.duration {
            start = self.duration - self.config.zoom_out_duration;
        }
        let start = start
            .max(self.settle_ts)
            .max(self.last_emit_ts() + MIN_KEYFRAME_SPACING);
        let end = (start + self.config.zoom_out_duration).max(start + MIN_KEYFRAME_SPACING);

        self.emit(ZoomKeyframe::new(
            start,
            self.current_scale,
            self.current_center,
            Easing::Linear,
        ));
        self.emit(ZoomKeyframe::neutral(end, self.config.easing));
        self.state = GeneratorState::Idle;
        self.current_scale = 1.0;
        self.current_center = NormalizedPoint::CENTER;
    }

    fn set_hold_window(&mut self, anchor: f64, count: usize, next_click_ts: Option<f64>) {
        let base = self.config.hold_base
            + count.saturating_sub(1) as f64 * self.config.hold_extension_per_event;
        let mut end = anchor + base.min(self.config.hold_max);

        // Typing right after the zoom extends the hold: the user is reading
        // or filling in what they just clicked.
        let buffer = self.config.keyboard_protection_buffer;
        if let Some(last_key) = self
            .key_downs
            .iter()
            .copied()
            .filter(|&key_ts| key_ts >= anchor && key_ts <= anchor + buffer)
            .fold(None, |acc: Option<f64>, key_ts| Some(acc.map_or(key_ts, |a| a.max(key_ts))))
        {
            end = end.max(last_key + buffer);
        }

        if let Some(next) = next_click_ts {
            end = end.min(next);
        }

        self.hold_start = anchor;
        self.hold_end = end.max(anchor);
    }

    fn debounce_applies(&self, click: &MergedClick) -> bool {
        let window_start = click.ts - self.config.debounce_time_window;
        let mut min_x = click.position.x;
        let mut max_x = click.position.x;
        let mut min_y = click.position.y;
        let mut max_y = click.position.y;
        let mut recent = 1usize;

        for sample in self.recent_clicks.iter().rev() {
            if sample.ts < window_start {
                break;
            }
            min_x = min_x.min(sample.position.x);
            max_x = max_x.max(sample.position.x);
            min_y = min_y.min(sample.position.y);
            max_y = max_y.max(sample.position.y);
            recent += 1;
        }

        recent >= 2 && (max_x - min_x) * (max_y - min_y) < self.config.debounce_area_threshold
    }

    fn is_zoomed(&self) -> bool {
        matches!(
            self.state,
            GeneratorState::Zoomed(_)
                | GeneratorState::Following(_)
                | GeneratorState::Transitioning { .. }
        )
    }

    fn key_near(&self, ts: f64) -> bool {
        self.key_downs
            .iter()
            .any(|&key_ts| (key_ts - ts).abs() <= self.config.keyboard_veto_window)
    }

    /// Latest of click and keyboard activity at or before `ts`.
    fn effective_activity(&self, ts: f64) -> f64 {
        self.key_downs
            .iter()
            .copied()
            .filter(|&key_ts| key_ts <= ts)
            .fold(self.last_activity, f64::max)
    }

    fn touch(&mut self, click: &MergedClick) {
        self.last_activity = click.ts;
        self.recent_clicks.push(ClickSample {
            ts: click.ts,
            position: click.position,
        });
    }

    fn constrain(&self, desired: NormalizedPoint, scale: f64) -> NormalizedPoint {
        constrain_center(desired, scale, desired, self.config.visibility_margin)
    }

    fn emit_pin(&mut self, ts: f64) {
        self.emit(ZoomKeyframe::new(
            ts,
            self.current_scale,
            self.current_center,
            Easing::Linear,
        ));
    }

    fn emit(&mut self, frame: ZoomKeyframe) {
        self.keyframes.push(frame);
    }

    fn last_emit_ts(&self) -> f64 {
        self.keyframes.last().map_or(0.0, |frame| frame.ts)
    }
}

/// Runs the whole pipeline: event split, click merging, the controller
/// fold, and timeline assembly.
pub fn generate_zoom_timeline(
    events: &EventsFile,
    config: &ZoomConfig,
) -> Result<ZoomTimeline, ConfigError> {
    config.validate()?;

    let mut moves: Vec<TimedPoint> = Vec::new();
    let mut clicks: Vec<ClickSample> = Vec::new();
    let mut key_downs: Vec<f64> = Vec::new();

    for event in &events.events {
        match event {
            InputEvent::Move { ts, x, y } => {
                moves.push(TimedPoint::new(*ts, x.clamp(0.0, 1.0), y.clamp(0.0, 1.0)));
            }
            InputEvent::Click { ts, x, y, .. } => {
                clicks.push(ClickSample {
                    ts: *ts,
                    position: NormalizedPoint::new(*x, *y).clamped(),
                });
            }
            InputEvent::KeyDown { ts, .. } => key_downs.push(*ts),
            InputEvent::KeyUp { .. } => {}
        }
    }

    // Raw cursor samples carry sensor jitter; run the default filter over
    // them once so every detector downstream sees the same smoothed path.
    let moves = smooth_moves(&moves, config);

    let merged = merge_clicks(&clicks, events.screen_width, events.screen_height, config);
    log::debug!(
        "generating timeline: {} clicks -> {} merged, {} moves, {} key events",
        clicks.len(),
        merged.len(),
        moves.len(),
        key_downs.len()
    );

    let controller = ContinuousZoomController::new(config, &moves, &key_downs, events.duration);
    let keyframes = controller.run(&merged);

    Ok(ZoomTimeline::from_keyframes(keyframes, events.duration))
}

fn smooth_moves(moves: &[TimedPoint], config: &ZoomConfig) -> Vec<TimedPoint> {
    let mut filter = OneEuroFilter2::new(
        config.one_euro_min_cutoff,
        config.one_euro_beta,
        config.one_euro_d_cutoff,
    );
    moves
        .iter()
        .map(|sample| TimedPoint::from_point(sample.ts, filter.filter(sample.pos(), sample.ts)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::events::MouseButton;

    fn events_file(duration: f64, events: Vec<InputEvent>) -> EventsFile {
        let _ = env_logger::builder().is_test(true).try_init();
        EventsFile {
            schema_version: 1,
            recording_id: "test".to_string(),
            duration,
            screen_width: 1920,
            screen_height: 1080,
            events,
        }
    }

    fn click(ts: f64, x: f64, y: f64) -> InputEvent {
        InputEvent::Click {
            ts,
            x,
            y,
            button: MouseButton::Left,
        }
    }

    fn key(ts: f64) -> InputEvent {
        InputEvent::KeyDown {
            ts,
            key_code: "KeyA".to_string(),
        }
    }

    fn moves(start_ts: f64, from: (f64, f64), to: (f64, f64), steps: usize, dt: f64) -> Vec<InputEvent> {
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                InputEvent::Move {
                    ts: start_ts + i as f64 * dt,
                    x: from.0 + (to.0 - from.0) * t,
                    y: from.1 + (to.1 - from.1) * t,
                }
            })
            .collect()
    }

    fn assert_boundary_invariant(timeline: &ZoomTimeline) {
        for frame in timeline.keyframes() {
            if frame.scale <= 1.0 {
                continue;
            }
            let half = 1.0 / (2.0 * frame.scale);
            assert!(
                frame.center.x >= half - 1e-9 && frame.center.x <= 1.0 - half + 1e-9,
                "x center {} escapes viewport at scale {}",
                frame.center.x,
                frame.scale
            );
            assert!(
                frame.center.y >= half - 1e-9 && frame.center.y <= 1.0 - half + 1e-9,
                "y center {} escapes viewport at scale {}",
                frame.center.y,
                frame.scale
            );
        }
    }

    fn assert_monotonic(timeline: &ZoomTimeline) {
        for pair in timeline.keyframes().windows(2) {
            assert!(pair[1].ts - pair[0].ts >= MIN_KEYFRAME_SPACING - 1e-12);
        }
    }

    #[test]
    fn no_clicks_yields_only_the_initial_idle_keyframe() {
        let config = ZoomConfig::default();
        let file = events_file(10.0, moves(0.0, (0.1, 0.1), (0.9, 0.9), 100, 0.05));

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_eq!(timeline.len(), 1);
        let only = timeline.keyframes()[0];
        assert_eq!(only.ts, 0.0);
        assert_eq!(only.scale, 1.0);
        assert_eq!(only.center, NormalizedPoint::CENTER);
    }

    #[test]
    fn empty_event_log_yields_the_idle_keyframe() {
        let timeline =
            generate_zoom_timeline(&events_file(5.0, Vec::new()), &ZoomConfig::default()).unwrap();
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline.state_at(2.5), crate::models::timeline::CameraState::NEUTRAL);
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let config = ZoomConfig {
            zoom_in_duration: -1.0,
            ..ZoomConfig::default()
        };
        assert!(generate_zoom_timeline(&events_file(5.0, Vec::new()), &config).is_err());
    }

    #[test]
    fn single_click_zooms_in_and_back_out_after_idle_timeout() {
        let config = ZoomConfig::default();
        let file = events_file(4.0, vec![click(0.0, 0.9, 0.9)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        // zoomed in shortly after the click
        assert!(timeline.state_at(1.5).scale > 1.5);
        // idle_timeout 3.0 + zoom_out 1.0 capped at duration: neutral at 4.0
        let end = timeline.state_at(4.0);
        assert!((end.scale - 1.0).abs() < 1e-9);
        assert_eq!(end.center, NormalizedPoint::CENTER);
    }

    #[test]
    fn idle_zoom_out_lands_on_the_idle_boundary() {
        let config = ZoomConfig::default();
        let file = events_file(10.0, vec![click(1.0, 0.5, 0.5)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        // zoom-out pair: pin at 1.0 + 3.0, neutral one zoom_out_duration later
        let last = timeline.keyframes().last().unwrap();
        assert!((last.ts - 5.0).abs() < 1e-9);
        assert_eq!(last.scale, 1.0);
        assert!((timeline.state_at(4.0).scale - config.base_zoom_scale).abs() < 1e-9);
    }

    #[test]
    fn debounced_clicks_add_no_keyframes() {
        let config = ZoomConfig::default();
        let file = events_file(
            10.0,
            vec![
                click(1.0, 0.5, 0.5),
                click(2.5, 0.5, 0.5),
                click(2.9, 0.501, 0.5),
                click(3.3, 0.5, 0.501),
            ],
        );

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        // initial idle, zoom-in pin+target, final zoom-out pin+neutral
        assert_eq!(timeline.len(), 5);
        // no frames between the zoom-in settling and the final zoom-out
        let quiet: Vec<_> = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts > 2.0 && frame.ts < 6.0)
            .collect();
        assert!(quiet.is_empty());
    }

    #[test]
    fn early_far_click_is_dropped() {
        let config = ZoomConfig::default();
        // Second click 0.6 s after the first lands mid-hold, far enough to
        // escape hysteresis, and must not move the camera.
        let file = events_file(10.0, vec![click(1.0, 0.3, 0.3), click(1.6, 0.55, 0.55)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        let between: Vec<_> = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts > 1.9 && frame.ts < 4.0)
            .collect();
        assert!(between.is_empty());
    }

    #[test]
    fn large_jump_takes_a_two_phase_transition() {
        let config = ZoomConfig::default();
        // second click past hold_min but inside the idle timeout
        let file = events_file(15.0, vec![click(1.0, 0.2, 0.2), click(3.5, 0.8, 0.8)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        // the transition dips to an intermediate scale before re-zooming
        let dip = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts > 3.5 && frame.ts < 5.5)
            .map(|frame| frame.scale)
            .fold(f64::MAX, f64::min);
        assert!(dip < config.base_zoom_scale);

        // and ends looking at the second click
        let settled = timeline.state_at(6.0);
        assert!(settled.scale > 1.5);
        assert!(settled.center.x > 0.6 && settled.center.y > 0.6);
    }

    #[test]
    fn moderate_move_pans_without_dipping() {
        let config = ZoomConfig::default();
        // distance 0.2: below large_distance_threshold, past hold_min
        let file = events_file(15.0, vec![click(1.0, 0.4, 0.5), click(3.5, 0.6, 0.5)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        let during: Vec<_> = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts >= 3.5 && frame.ts <= 3.5 + config.pan_duration + 1e-9)
            .collect();
        assert_eq!(during.len(), 2); // pin + pan target, no intermediate dip
        assert!(during.iter().all(|frame| frame.scale >= config.base_zoom_scale - 1e-9));
        assert!((during[1].center.x - 0.6).abs() < 0.05);
    }

    #[test]
    fn keyboard_veto_zooms_out_instead_of_retargeting() {
        let config = ZoomConfig::default();
        let file = events_file(
            12.0,
            vec![click(1.0, 0.5, 0.5), key(6.9), click(7.0, 0.8, 0.8)],
        );

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);

        // zoomed back to neutral shortly after the vetoed click
        let after = timeline.state_at(8.5);
        assert!((after.scale - 1.0).abs() < 1e-9);
        // and never re-targeted (0.8, 0.8)
        assert!(timeline
            .keyframes()
            .iter()
            .all(|frame| frame.center.x < 0.7));
    }

    #[test]
    fn keyboard_activity_defers_the_idle_zoom_out() {
        let config = ZoomConfig::default();
        let file = events_file(20.0, vec![click(1.0, 0.5, 0.5), key(5.0)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        // still zoomed well past click + idle_timeout thanks to the key press
        assert!(timeline.state_at(4.5).scale > 1.5);
        let last = timeline.keyframes().last().unwrap();
        // key 5.0 + protection buffer 5.0 extends the hold; + zoom_out 1.0
        assert!((last.ts - 11.0).abs() < 1e-9);
        assert_eq!(last.scale, 1.0);
    }

    #[test]
    fn click_during_scheduled_zoom_out_never_passes_through_neutral() {
        let config = ZoomConfig::default();
        // idle gap of 3.6 s: zoom-out scheduled at 4.0; second click at 4.6
        // lands inside its 1 s window.
        let file = events_file(15.0, vec![click(1.0, 0.3, 0.3), click(4.6, 0.8, 0.2)]);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        // the cancelled zoom-out left no neutral frame in its window
        for frame in timeline.keyframes() {
            if frame.ts > 3.9 && frame.ts < 5.6 {
                assert!(frame.scale > 1.0, "neutral frame at {:.3}s survived", frame.ts);
            }
        }
        // re-zoomed onto the second click
        let settled = timeline.state_at(6.0);
        assert!(settled.scale > 1.5);
        assert!(settled.center.x > 0.6);
    }

    #[test]
    fn click_during_veto_zoom_out_re_zooms_without_passing_through_neutral() {
        let config = ZoomConfig::default();
        // key at 6.9 vetoes the click at 7.0 and schedules a zoom-out over
        // 6.9..7.9; the click at 7.3 lands inside that window
        let file = events_file(
            14.0,
            vec![
                click(1.0, 0.5, 0.5),
                key(6.9),
                click(7.0, 0.8, 0.8),
                click(7.3, 0.3, 0.5),
            ],
        );

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        for frame in timeline.keyframes() {
            if frame.ts > 6.85 && frame.ts < 8.25 {
                assert!(frame.scale > 1.0, "neutral frame at {:.3}s survived", frame.ts);
            }
        }
        // re-zoomed onto the interrupting click
        let settled = timeline.state_at(9.0);
        assert!(settled.scale > 1.5);
        assert!(settled.center.x < 0.45);
    }

    #[test]
    fn cursor_jitter_does_not_enter_follow_mode() {
        let config = ZoomConfig::default();
        // small-amplitude noise around the click, well under the follow
        // movement threshold
        let mut events = vec![click(1.0, 0.5, 0.5)];
        events.extend((0..60).map(|i| InputEvent::Move {
            ts: 1.05 + i as f64 * 0.05,
            x: 0.5 + if i % 2 == 0 { 0.02 } else { -0.02 },
            y: 0.5,
        }));
        let file = events_file(10.0, events);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        // idle, zoom-in pin+target, final zoom-out pin+neutral: no follow
        assert_eq!(timeline.len(), 5);
    }

    #[test]
    fn click_then_move_enters_follow_mode() {
        let config = ZoomConfig::default();
        let mut events = vec![click(1.0, 0.2, 0.5)];
        events.extend(moves(1.1, (0.2, 0.5), (0.8, 0.5), 60, 0.05));
        let file = events_file(15.0, events);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        // follow emits a trail of keyframes tracking the sweep
        let follow_frames: Vec<_> = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts > 2.0 && frame.ts < 5.0 && frame.scale > 1.0)
            .collect();
        assert!(follow_frames.len() >= 3);
        let first = follow_frames.first().unwrap();
        let last = follow_frames.last().unwrap();
        assert!(last.center.x > first.center.x + 0.1);
    }

    #[test]
    fn query_is_continuous_over_a_busy_session() {
        let config = ZoomConfig::default();
        let mut events = vec![
            click(1.0, 0.2, 0.2),
            click(5.0, 0.8, 0.8),
            click(9.0, 0.5, 0.1),
        ];
        events.extend(moves(0.0, (0.2, 0.2), (0.8, 0.8), 200, 0.05));
        let file = events_file(20.0, events);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        let step = 0.01;
        let mut previous = timeline.state_at(0.0);
        let mut t = step;
        while t < 20.0 {
            let state = timeline.state_at(t);
            assert!(
                (state.scale - previous.scale).abs() < 0.1,
                "scale jump at {t:.2}s"
            );
            assert!(state.center.distance_to(previous.center) < 0.1, "pan jump at {t:.2}s");
            previous = state;
            t += step;
        }
    }

    #[test]
    fn rapid_session_clicks_do_not_trigger_two_phase_transitions() {
        // hold_min 0 lets the third click through the hold gate; the longer
        // session window keeps it session-active despite the 0.9 s gap.
        let config = ZoomConfig {
            hold_min: 0.0,
            active_session_timeout: 2.0,
            ..ZoomConfig::default()
        };
        let file = events_file(
            15.0,
            vec![click(1.0, 0.2, 0.2), click(3.8, 0.25, 0.2), click(4.7, 0.9, 0.9)],
        );

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        // the far jump at 4.7 pans but must not dip through the intermediate
        // scale of a two-phase transition
        let during: Vec<_> = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts > 4.65 && frame.ts < 5.6)
            .collect();
        assert_eq!(during.len(), 2); // pin + pan target only
        assert!(during.iter().all(|frame| frame.scale > 1.4));
        let settled = timeline.state_at(6.0);
        assert!(settled.center.x > 0.7 && settled.center.y > 0.7);
    }

    #[test]
    fn merged_click_drift_pans_to_the_last_click_and_extends_the_hold() {
        let config = ZoomConfig::default();
        // six clicks walking right, each within the merge gates: one merged
        // click with a 0.1 first-to-last spread
        let file = events_file(
            12.0,
            (0..6)
                .map(|i| click(1.0 + i as f64 * 0.3, 0.5 + i as f64 * 0.02, 0.5))
                .collect(),
        );

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        // idle, zoom-in pin+target, drift pan, final zoom-out pin+neutral
        assert_eq!(timeline.len(), 6);
        let pan = timeline.keyframes()[3];
        assert!((pan.ts - 2.6).abs() < 1e-9); // zoom_in end 1.8 + pan 0.8
        assert!((pan.center.x - 0.6).abs() < 1e-9);

        // hold: base 2.0 + 5 extensions of 0.8 capped at hold_max 5.0, so
        // the final zoom-out starts at 2.6 + 5.0 rather than 1.0 + 3.0
        let last = timeline.keyframes().last().unwrap();
        assert!((last.ts - 8.6).abs() < 1e-9);
        assert_eq!(last.scale, 1.0);
    }

    #[test]
    fn pre_click_buffer_starts_the_zoom_before_the_click() {
        let file = events_file(10.0, vec![click(1.0, 0.5, 0.5)]);

        let buffered = generate_zoom_timeline(&file, &ZoomConfig::default()).unwrap();
        let pin = buffered.keyframes()[1];
        assert!((pin.ts - 0.8).abs() < 1e-9);
        assert_eq!(pin.scale, 1.0);

        let config = ZoomConfig {
            pre_click_buffer_enabled: false,
            ..ZoomConfig::default()
        };
        let unbuffered = generate_zoom_timeline(&file, &config).unwrap();
        assert!((unbuffered.keyframes()[1].ts - 1.0).abs() < 1e-9);
    }

    #[test]
    fn movement_late_in_the_hold_enters_follow_mode() {
        let config = ZoomConfig::default();
        // the cursor only starts moving 1.5 s after the click, well past the
        // initial detection window but inside the hold
        let mut events = vec![click(1.0, 0.3, 0.5)];
        events.extend(moves(2.5, (0.3, 0.5), (0.8, 0.5), 20, 0.05));
        let file = events_file(15.0, events);

        let timeline = generate_zoom_timeline(&file, &config).unwrap();
        assert_monotonic(&timeline);
        assert_boundary_invariant(&timeline);

        let follow_frames: Vec<_> = timeline
            .keyframes()
            .iter()
            .filter(|frame| frame.ts > 2.6 && frame.ts < 3.85 && frame.scale > 1.0)
            .collect();
        assert!(follow_frames.len() >= 2);
        let first = follow_frames.first().unwrap();
        let last = follow_frames.last().unwrap();
        assert!(last.center.x > first.center.x + 0.05);
    }
}
