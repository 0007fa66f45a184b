//! Схема событий ввода (events.json).
//! schemaVersion: 1

use serde::{Deserialize, Serialize};

pub const SCHEMA_VERSION: u32 = 1;

/// Точка в нормализованных координатах экрана: (0.0–1.0) по обеим осям.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    /// Центр экрана — нейтральное положение камеры.
    pub const CENTER: NormalizedPoint = NormalizedPoint { x: 0.5, y: 0.5 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Евклидово расстояние до другой точки (в нормализованных единицах).
    pub fn distance_to(self, other: NormalizedPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Копия с координатами, зажатыми в [0.0, 1.0].
    pub fn clamped(self) -> NormalizedPoint {
        NormalizedPoint {
            x: self.x.clamp(0.0, 1.0),
            y: self.y.clamp(0.0, 1.0),
        }
    }
}

/// Кнопка мыши.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Тип события ввода.
///
/// Все координаты нормализованы, все временные метки — секунды от начала
/// записи (f64).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InputEvent {
    /// Движение мыши.
    Move { ts: f64, x: f64, y: f64 },
    /// Нажатие кнопки мыши.
    Click {
        ts: f64,
        x: f64,
        y: f64,
        button: MouseButton,
    },
    /// Нажатие клавиши.
    KeyDown {
        ts: f64,
        #[serde(rename = "keyCode", alias = "key_code")]
        key_code: String,
    },
    /// Отпускание клавиши.
    KeyUp {
        ts: f64,
        #[serde(rename = "keyCode", alias = "key_code")]
        key_code: String,
    },
}

impl InputEvent {
    /// Возвращает временную метку события.
    pub fn ts(&self) -> f64 {
        match self {
            InputEvent::Move { ts, .. } => *ts,
            InputEvent::Click { ts, .. } => *ts,
            InputEvent::KeyDown { ts, .. } => *ts,
            InputEvent::KeyUp { ts, .. } => *ts,
        }
    }

    /// Позиция курсора для событий, у которых она есть.
    pub fn pos(&self) -> Option<NormalizedPoint> {
        match self {
            InputEvent::Move { x, y, .. } | InputEvent::Click { x, y, .. } => {
                Some(NormalizedPoint::new(*x, *y))
            }
            _ => None,
        }
    }
}

/// Корневой контейнер файла events.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsFile {
    pub schema_version: u32,
    /// UUID записи — совпадает с project.json.
    pub recording_id: String,
    /// Длительность записи (секунды).
    pub duration: f64,
    /// Разрешение экрана на момент записи: нужно для перевода пиксельных
    /// порогов (слияние кликов) в нормализованные единицы.
    pub screen_width: u32,
    pub screen_height: u32,
    pub events: Vec<InputEvent>,
}
