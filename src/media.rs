use anyhow::Result;
use log::info;

use crate::story::{Segment, Story};

/// Thin handle over whatever actually renders a segment (a `<video>` element,
/// a native decoder, a test double). The state machine never touches media
/// directly; the controller drives one handle at a time through this trait.
pub trait MediaHandle: Send {
    /// Attempt to start playback. Autoplay rejection is a normal outcome and
    /// must not stall the story; callers swallow the error.
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn set_muted(&mut self, muted: bool);

    /// Duration reported by the media itself, if metadata was available at
    /// mount time. `None` for images and for videos still missing metadata.
    fn duration_ms(&self) -> Option<u64>;

    /// Detach the media: stop decoding, clear the source. Called before the
    /// next segment mounts so nothing bleeds from an off-screen element.
    fn unload(&mut self);
}

/// Creates a handle for each segment as it becomes active.
pub trait MediaFactory: Send + Sync {
    fn mount(&self, story: &Story, segment: &Segment) -> Result<Box<dyn MediaHandle>>;
}

/// Log-only media implementation used by the demo binary.
pub struct LogMedia {
    source: String,
}

impl MediaHandle for LogMedia {
    fn play(&mut self) -> Result<()> {
        info!("media play: {}", self.source);
        Ok(())
    }

    fn pause(&mut self) {
        info!("media pause: {}", self.source);
    }

    fn set_muted(&mut self, muted: bool) {
        info!("media muted={} for {}", muted, self.source);
    }

    fn duration_ms(&self) -> Option<u64> {
        // Headless demo has no decoder, so videos fall back to the
        // configured constant.
        None
    }

    fn unload(&mut self) {
        info!("media unload: {}", self.source);
    }
}

pub struct LogMediaFactory;

impl MediaFactory for LogMediaFactory {
    fn mount(&self, story: &Story, segment: &Segment) -> Result<Box<dyn MediaHandle>> {
        info!("mounting segment {} of story {}", segment.source, story.id);
        Ok(Box::new(LogMedia {
            source: segment.source.clone(),
        }))
    }
}
