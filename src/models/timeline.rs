//! Схема таймлайна камеры (timeline.json).
//! schemaVersion: 1

use serde::{Deserialize, Serialize};

use crate::models::events::NormalizedPoint;

pub const SCHEMA_VERSION: u32 = 1;

/// Минимальный зазор между соседними ключевыми кадрами (секунды).
/// Кадры ближе друг к другу считаются дубликатами и отбрасываются.
pub const MIN_KEYFRAME_SPACING: f64 = 0.010;

/// Easing-функция для интерполяции между ключевыми кадрами.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Default for Easing {
    fn default() -> Self {
        Easing::EaseInOut
    }
}

impl Easing {
    /// Применяет квадратичную кривую к прогрессу t в [0, 1].
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => {
                let u = 1.0 - t;
                1.0 - u * u
            }
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = 2.0 - 2.0 * t;
                    1.0 - u * u * 0.5
                }
            }
        }
    }
}

/// Один ключевой кадр виртуальной камеры.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomKeyframe {
    /// Секунды от начала записи.
    pub ts: f64,
    /// Масштаб камеры, всегда >= 1.0.
    pub scale: f64,
    /// Центр видимой области в нормализованных координатах.
    pub center: NormalizedPoint,
    /// Easing сегмента, ВХОДЯЩЕГО в этот кадр.
    #[serde(default)]
    pub easing: Easing,
}

impl ZoomKeyframe {
    pub fn new(ts: f64, scale: f64, center: NormalizedPoint, easing: Easing) -> Self {
        Self {
            ts,
            scale: scale.max(1.0),
            center,
            easing,
        }
    }

    /// Нейтральный кадр: без зума, центр экрана.
    pub fn neutral(ts: f64, easing: Easing) -> Self {
        Self::new(ts, 1.0, NormalizedPoint::CENTER, easing)
    }
}

/// Состояние камеры в произвольный момент времени — результат запроса к
/// таймлайну.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub scale: f64,
    pub center: NormalizedPoint,
}

impl CameraState {
    pub const NEUTRAL: CameraState = CameraState {
        scale: 1.0,
        center: NormalizedPoint::CENTER,
    };
}

/// Неизменяемая, отсортированная последовательность ключевых кадров.
///
/// Создаётся один раз за проход генератора; после создания кадры не
/// мутируются.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoomTimeline {
    keyframes: Vec<ZoomKeyframe>,
    /// Длительность записи (секунды).
    duration: f64,
}

impl ZoomTimeline {
    /// Собирает таймлайн: сортирует кадры по времени и отбрасывает кадры,
    /// попадающие ближе [`MIN_KEYFRAME_SPACING`] к предыдущему.
    pub fn from_keyframes(mut keyframes: Vec<ZoomKeyframe>, duration: f64) -> Self {
        keyframes.sort_by(|a, b| a.ts.total_cmp(&b.ts));

        let mut deduped: Vec<ZoomKeyframe> = Vec::with_capacity(keyframes.len());
        for frame in keyframes {
            match deduped.last() {
                Some(last) if frame.ts - last.ts < MIN_KEYFRAME_SPACING => continue,
                _ => deduped.push(frame),
            }
        }

        Self {
            keyframes: deduped,
            duration: duration.max(0.0),
        }
    }

    pub fn keyframes(&self) -> &[ZoomKeyframe] {
        &self.keyframes
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Интерполированное состояние камеры в момент `ts`.
    ///
    /// До первого кадра — первый кадр, после последнего — последний. Между
    /// кадрами — линейная по времени интерполяция масштаба и центра,
    /// сглаженная easing-кривой ПОЗДНЕГО кадра.
    pub fn state_at(&self, ts: f64) -> CameraState {
        let frames = &self.keyframes;
        let Some(first) = frames.first() else {
            return CameraState::NEUTRAL;
        };

        if ts <= first.ts {
            return CameraState {
                scale: first.scale,
                center: first.center,
            };
        }

        let last = frames[frames.len() - 1];
        if ts >= last.ts {
            return CameraState {
                scale: last.scale,
                center: last.center,
            };
        }

        // Первый кадр со временем > ts; его предшественник существует,
        // потому что ts > first.ts.
        let next_idx = frames.partition_point(|frame| frame.ts <= ts);
        let from = frames[next_idx - 1];
        let to = frames[next_idx];

        let span = to.ts - from.ts;
        if span <= f64::EPSILON {
            return CameraState {
                scale: from.scale,
                center: from.center,
            };
        }

        let progress = to.easing.apply((ts - from.ts) / span);
        CameraState {
            scale: from.scale + (to.scale - from.scale) * progress,
            center: NormalizedPoint::new(
                from.center.x + (to.center.x - from.center.x) * progress,
                from.center.y + (to.center.y - from.center.y) * progress,
            ),
        }
    }
}

/// Корневой контейнер файла timeline.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineFile {
    pub schema_version: u32,
    /// UUID записи — совпадает с events.json.
    pub recording_id: String,
    pub timeline: ZoomTimeline,
}

impl TimelineFile {
    pub fn new(recording_id: String, timeline: ZoomTimeline) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            recording_id,
            timeline,
        }
    }
}
