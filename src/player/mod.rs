pub mod controller;
pub mod events;
pub mod state;

pub use controller::{Key, PlayerSnapshot, StoryPlayer};
pub use events::{EventSink, PlayerEvent};
pub use state::{PlaybackCursor, PlayerState, PlayerStatus, Step};
