pub mod config;
pub mod media;
pub mod player;
pub mod story;

pub use config::PlayerConfig;
pub use media::{LogMediaFactory, MediaFactory, MediaHandle};
pub use player::{
    EventSink, Key, PlayerEvent, PlayerSnapshot, PlayerState, PlayerStatus, StoryPlayer,
};
pub use story::{Segment, SegmentKind, Story, StoryManifest};
