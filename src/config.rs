use std::time::Duration;

/// Tunable playback constants shared by the state machine and the frame ticker.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Display duration for image segments without an explicit override.
    pub image_duration_ms: u64,

    /// Advance threshold for video segments whose metadata never reported a
    /// duration (and which carry no explicit override).
    pub video_fallback_ms: u64,

    /// Frame ticker period for the async driver. Playback speed does not
    /// depend on this; elapsed time is measured by wall-clock deltas.
    pub frame_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            image_duration_ms: 5_000,
            video_fallback_ms: 7_000,
            frame_interval: Duration::from_millis(16),
        }
    }
}
