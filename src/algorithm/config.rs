use thiserror::Error;

use crate::algorithm::spring::SpringParams;
use crate::models::timeline::Easing;

/// Malformed configuration is the only fatal condition in the generator;
/// everything else clamps or falls back.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("zoom scale clamp is inverted: min {min} > max {max}")]
    InvertedScaleClamp { min: f64, max: f64 },
    #[error("hold window is inverted: min {min}, base {base}, max {max}")]
    InvertedHoldWindow { min: f64, base: f64, max: f64 },
}

/// Tunables for one generation pass. All durations are seconds, all
/// distances normalized unless the name says px.
#[derive(Debug, Clone)]
pub struct ZoomConfig {
    pub base_zoom_scale: f64,
    pub min_zoom_scale: f64,
    pub max_zoom_scale: f64,
    pub corner_boost_strength: f64,

    pub zoom_in_duration: f64,
    pub zoom_out_duration: f64,
    pub pan_duration: f64,
    pub easing: Easing,
    pub spring: SpringParams,

    pub hold_min: f64,
    pub hold_base: f64,
    pub hold_max: f64,
    pub hold_extension_per_event: f64,

    pub idle_timeout: f64,
    pub keyboard_veto_window: f64,
    pub keyboard_protection_buffer: f64,

    pub large_distance_threshold: f64,
    /// Fraction of `large_distance_threshold` under which hysteresis absorbs
    /// a click during the early hold phase.
    pub hysteresis_distance_ratio: f64,
    pub active_session_timeout: f64,
    pub debounce_area_threshold: f64,
    pub debounce_time_window: f64,

    pub click_merge_time: f64,
    pub click_merge_distance_px: f64,

    pub pre_click_buffer: f64,
    pub pre_click_buffer_enabled: bool,

    pub follow_keyframe_interval: f64,
    pub follow_detection_window: f64,
    pub follow_min_move_distance: f64,
    pub follow_tail: f64,
    pub follow_max_duration: f64,
    /// Follow-mode smoothing is deliberately stronger than the defaults a
    /// general cursor filter would use.
    pub follow_min_cutoff: f64,
    pub follow_beta: f64,
    pub follow_d_cutoff: f64,
    pub follow_spring_stiffness: f64,
    pub follow_spring_mass: f64,

    pub one_euro_min_cutoff: f64,
    pub one_euro_beta: f64,
    pub one_euro_d_cutoff: f64,

    pub rdp_epsilon: f64,
    pub follow_max_keyframe_gap: f64,

    pub visibility_margin: f64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            base_zoom_scale: 2.0,
            min_zoom_scale: 1.0,
            max_zoom_scale: 3.0,
            corner_boost_strength: 0.6,

            zoom_in_duration: 1.0,
            zoom_out_duration: 1.0,
            pan_duration: 0.8,
            easing: Easing::EaseInOut,
            spring: SpringParams::smooth(),

            hold_min: 1.0,
            hold_base: 2.0,
            hold_max: 5.0,
            hold_extension_per_event: 0.8,

            idle_timeout: 3.0,
            keyboard_veto_window: 0.3,
            keyboard_protection_buffer: 5.0,

            large_distance_threshold: 0.3,
            hysteresis_distance_ratio: 0.5,
            active_session_timeout: 1.0,
            debounce_area_threshold: 0.05,
            debounce_time_window: 1.2,

            click_merge_time: 0.35,
            click_merge_distance_px: 50.0,

            pre_click_buffer: 0.2,
            pre_click_buffer_enabled: true,

            follow_keyframe_interval: 1.0 / 30.0,
            follow_detection_window: 0.8,
            follow_min_move_distance: 0.08,
            follow_tail: 0.5,
            follow_max_duration: 8.0,
            follow_min_cutoff: 0.3,
            follow_beta: 0.002,
            follow_d_cutoff: 1.0,
            follow_spring_stiffness: 170.0,
            follow_spring_mass: 1.0,

            one_euro_min_cutoff: 1.0,
            one_euro_beta: 0.007,
            one_euro_d_cutoff: 1.0,

            rdp_epsilon: 0.005,
            follow_max_keyframe_gap: 0.4,

            visibility_margin: 0.05,
        }
    }
}

impl ZoomConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("zoom_in_duration", self.zoom_in_duration),
            ("zoom_out_duration", self.zoom_out_duration),
            ("pan_duration", self.pan_duration),
            ("idle_timeout", self.idle_timeout),
            ("click_merge_time", self.click_merge_time),
            ("click_merge_distance_px", self.click_merge_distance_px),
            ("follow_keyframe_interval", self.follow_keyframe_interval),
            ("follow_detection_window", self.follow_detection_window),
            ("follow_min_move_distance", self.follow_min_move_distance),
            ("follow_max_duration", self.follow_max_duration),
            ("follow_min_cutoff", self.follow_min_cutoff),
            ("follow_d_cutoff", self.follow_d_cutoff),
            ("follow_spring_stiffness", self.follow_spring_stiffness),
            ("follow_spring_mass", self.follow_spring_mass),
            ("one_euro_min_cutoff", self.one_euro_min_cutoff),
            ("one_euro_d_cutoff", self.one_euro_d_cutoff),
            ("large_distance_threshold", self.large_distance_threshold),
            ("debounce_time_window", self.debounce_time_window),
            ("active_session_timeout", self.active_session_timeout),
            ("follow_max_keyframe_gap", self.follow_max_keyframe_gap),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        for (name, value) in [
            ("hold_min", self.hold_min),
            ("hold_extension_per_event", self.hold_extension_per_event),
            ("pre_click_buffer", self.pre_click_buffer),
            ("keyboard_veto_window", self.keyboard_veto_window),
            ("keyboard_protection_buffer", self.keyboard_protection_buffer),
            ("follow_tail", self.follow_tail),
            ("rdp_epsilon", self.rdp_epsilon),
            ("corner_boost_strength", self.corner_boost_strength),
            ("one_euro_beta", self.one_euro_beta),
            ("follow_beta", self.follow_beta),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }

        if self.min_zoom_scale < 1.0 {
            return Err(ConfigError::OutOfRange {
                name: "min_zoom_scale",
                value: self.min_zoom_scale,
                min: 1.0,
                max: f64::INFINITY,
            });
        }
        if self.min_zoom_scale > self.max_zoom_scale {
            return Err(ConfigError::InvertedScaleClamp {
                min: self.min_zoom_scale,
                max: self.max_zoom_scale,
            });
        }
        if self.base_zoom_scale < self.min_zoom_scale || self.base_zoom_scale > self.max_zoom_scale
        {
            return Err(ConfigError::OutOfRange {
                name: "base_zoom_scale",
                value: self.base_zoom_scale,
                min: self.min_zoom_scale,
                max: self.max_zoom_scale,
            });
        }

        if !(self.hold_min <= self.hold_base && self.hold_base <= self.hold_max) {
            return Err(ConfigError::InvertedHoldWindow {
                min: self.hold_min,
                base: self.hold_base,
                max: self.hold_max,
            });
        }

        if !(self.debounce_area_threshold > 0.0 && self.debounce_area_threshold < 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "debounce_area_threshold",
                value: self.debounce_area_threshold,
                min: 0.0,
                max: 1.0,
            });
        }
        if !(self.hysteresis_distance_ratio > 0.0 && self.hysteresis_distance_ratio <= 1.0) {
            return Err(ConfigError::OutOfRange {
                name: "hysteresis_distance_ratio",
                value: self.hysteresis_distance_ratio,
                min: 0.0,
                max: 1.0,
            });
        }
        if !(self.visibility_margin >= 0.0 && self.visibility_margin < 0.5) {
            return Err(ConfigError::OutOfRange {
                name: "visibility_margin",
                value: self.visibility_margin,
                min: 0.0,
                max: 0.5,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(ZoomConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_negative_duration() {
        let config = ZoomConfig {
            zoom_in_duration: -0.5,
            ..ZoomConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive {
                name: "zoom_in_duration",
                ..
            })
        ));
    }

    #[test]
    fn rejects_inverted_scale_clamp() {
        let config = ZoomConfig {
            min_zoom_scale: 3.0,
            max_zoom_scale: 2.0,
            ..ZoomConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedScaleClamp { .. })
        ));
    }

    #[test]
    fn rejects_inverted_hold_window() {
        let config = ZoomConfig {
            hold_min: 3.0,
            hold_base: 2.0,
            ..ZoomConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedHoldWindow { .. })
        ));
    }

    #[test]
    fn rejects_base_scale_outside_clamp() {
        let config = ZoomConfig {
            base_zoom_scale: 5.0,
            ..ZoomConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutOfRange {
                name: "base_zoom_scale",
                ..
            })
        ));
    }

    #[test]
    fn rejects_debounce_area_of_one() {
        let config = ZoomConfig {
            debounce_area_threshold: 1.0,
            ..ZoomConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn error_message_names_the_field() {
        let config = ZoomConfig {
            idle_timeout: 0.0,
            ..ZoomConfig::default()
        };
        let message = config.validate().unwrap_err().to_string();
        assert!(message.contains("idle_timeout"));
    }
}
