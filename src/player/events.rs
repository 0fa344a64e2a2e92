use serde::Serialize;

/// Caller-visible notifications, the in-process analog of a frontend event
/// channel. Mount/unmount of media is not an event; it goes through the
/// `MediaFactory` instead.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PlayerEvent {
    /// The active story was viewed for the first time. Fires at most once
    /// per story per player instance, and never for stories already seen.
    FirstView { story_id: String },
    /// Playback moved to the next sibling story.
    NextStory { story_id: String },
    /// Playback moved to the previous sibling story.
    PrevStory { story_id: String },
    MuteToggled { muted: bool },
    /// The player exited: end of the last story, Escape, or explicit close.
    Closed,
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: PlayerEvent);
}
