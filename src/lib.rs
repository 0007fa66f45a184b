//! Offline event-to-timeline generator for cinematic screen-recording
//! auto-zoom: consumes a recorded input-event log and produces a camera
//! keyframe timeline (scale, center, easing) for a renderer to replay.

pub mod algorithm;
pub mod models;

pub use algorithm::config::{ConfigError, ZoomConfig};
pub use algorithm::controller::{generate_zoom_timeline, ContinuousZoomController, GeneratorState};
pub use models::events::{EventsFile, InputEvent, MouseButton, NormalizedPoint};
pub use models::timeline::{CameraState, Easing, TimelineFile, ZoomKeyframe, ZoomTimeline};
