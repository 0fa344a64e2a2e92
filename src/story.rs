use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum SegmentKind {
    Image,
    Video,
}

/// One playable unit within a story. Media URLs are assumed pre-resolved by
/// the caller; the player never fetches anything itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub source: String,
    pub kind: SegmentKind,
    #[serde(default)]
    pub poster: Option<String>,
    /// Explicit display-duration override. Wins over reported video metadata.
    #[serde(default)]
    pub duration_ms: Option<u64>,
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,
}

fn default_autoplay() -> bool {
    true
}

impl Segment {
    /// Resolve the advance threshold for this segment.
    ///
    /// Priority: explicit override, then reported video duration, then the
    /// per-kind fallback constant. Images ignore `reported`.
    pub fn resolved_duration_ms(&self, reported: Option<u64>, config: &PlayerConfig) -> u64 {
        if let Some(override_ms) = self.duration_ms {
            return override_ms;
        }

        match self.kind {
            SegmentKind::Image => config.image_duration_ms,
            SegmentKind::Video => reported.unwrap_or(config.video_fallback_ms),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub segments: Vec<Segment>,
    /// Whether the viewer has already seen this story. Suppresses the
    /// first-view notification.
    #[serde(default)]
    pub seen: bool,
}

impl Story {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// On-disk story list consumed by the demo binary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryManifest {
    pub stories: Vec<Story>,
}

impl StoryManifest {
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read story manifest from {}", path.display()))?;
        let manifest: StoryManifest = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse story manifest {}", path.display()))?;
        Ok(manifest)
    }
}
