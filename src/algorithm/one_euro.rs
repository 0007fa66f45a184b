use crate::models::events::NormalizedPoint;

use std::f64::consts::TAU;

/// Adaptive low-pass filter for noisy cursor samples.
///
/// At low speeds the cutoff stays near `min_cutoff` (jitter removal); as the
/// signal speeds up, `beta` raises the cutoff so the filter lags less.
#[derive(Debug, Clone)]
pub struct OneEuroFilter {
    min_cutoff: f64,
    beta: f64,
    d_cutoff: f64,
    state: Option<FilterState>,
}

#[derive(Debug, Clone, Copy)]
struct FilterState {
    ts: f64,
    raw: f64,
    filtered: f64,
    derivative: f64,
}

fn smoothing_factor(cutoff: f64, elapsed: f64) -> f64 {
    let r = TAU * cutoff * elapsed;
    r / (r + 1.0)
}

impl OneEuroFilter {
    pub fn new(min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        Self {
            min_cutoff: min_cutoff.max(1e-6),
            beta: beta.max(0.0),
            d_cutoff: d_cutoff.max(1e-6),
            state: None,
        }
    }

    pub fn reset(&mut self) {
        self.state = None;
    }

    /// Filters one sample. The first sample seeds the filter and passes
    /// through unchanged; a non-increasing timestamp returns the previous
    /// filtered value.
    pub fn filter(&mut self, value: f64, ts: f64) -> f64 {
        let Some(prev) = self.state else {
            self.state = Some(FilterState {
                ts,
                raw: value,
                filtered: value,
                derivative: 0.0,
            });
            return value;
        };

        let elapsed = ts - prev.ts;
        if elapsed <= 0.0 {
            return prev.filtered;
        }

        let raw_derivative = (value - prev.raw) / elapsed;
        let d_alpha = smoothing_factor(self.d_cutoff, elapsed);
        let derivative = prev.derivative + (raw_derivative - prev.derivative) * d_alpha;

        let cutoff = self.min_cutoff + self.beta * derivative.abs();
        let alpha = smoothing_factor(cutoff, elapsed);
        let filtered = prev.filtered + (value - prev.filtered) * alpha;

        self.state = Some(FilterState {
            ts,
            raw: value,
            filtered,
            derivative,
        });
        filtered
    }
}

/// Independent x/y filter pair.
#[derive(Debug, Clone)]
pub struct OneEuroFilter2 {
    x: OneEuroFilter,
    y: OneEuroFilter,
}

impl OneEuroFilter2 {
    pub fn new(min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        Self {
            x: OneEuroFilter::new(min_cutoff, beta, d_cutoff),
            y: OneEuroFilter::new(min_cutoff, beta, d_cutoff),
        }
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }

    pub fn filter(&mut self, point: NormalizedPoint, ts: f64) -> NormalizedPoint {
        NormalizedPoint::new(self.x.filter(point.x, ts), self.y.filter(point.y, ts))
    }
}
