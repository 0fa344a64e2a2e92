use serde::{Deserialize, Serialize};

use crate::config::PlayerConfig;
use crate::story::{Segment, Story};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PlayerStatus {
    Playing,
    Paused,
    Closed,
}

/// Transient position within the active story. Reset whenever the active
/// segment changes, destroyed when the story is closed or replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackCursor {
    pub segment_index: usize,
    pub elapsed_ms: u64,
    /// Timestamp of the last frame that accumulated time; combines with the
    /// next frame's timestamp to form the wall-clock delta. Cleared on resume
    /// so no elapsed time is counted across a pause.
    #[serde(skip)]
    last_frame_ms: Option<u64>,
}

impl PlaybackCursor {
    fn at(segment_index: usize) -> Self {
        Self {
            segment_index,
            elapsed_ms: 0,
            last_frame_ms: None,
        }
    }
}

/// What a transition did, so the driver can apply media and event side
/// effects. The state machine itself performs no I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// No externally visible change.
    Stay,
    /// Clamped at the first segment of the first story; progress reset to 0.
    Restarted,
    /// Moved to another segment within the same story.
    Segment(usize),
    /// Switched to the next sibling story (new story index).
    NextStory(usize),
    /// Switched to the previous sibling story (new story index).
    PrevStory(usize),
    /// Reached the end with no next sibling, or was closed explicitly.
    Close,
}

/// Pure playback state machine for one viewing session across a story list.
/// All timing comes in through `frame()` as host-supplied timestamps, which
/// keeps the machine deterministic under test.
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub status: PlayerStatus,
    pub story_index: usize,
    pub cursor: PlaybackCursor,
    pub muted: bool,
    /// Advance threshold for the active segment, re-resolved on every segment
    /// change and again once the mounted media reports its duration.
    pub segment_duration_ms: u64,
    stories: Vec<Story>,
    /// First-view notifications already emitted, parallel to `stories`.
    notified: Vec<bool>,
    config: PlayerConfig,
}

impl PlayerState {
    pub fn new(stories: Vec<Story>, start_index: usize, muted: bool, config: PlayerConfig) -> Self {
        let notified = vec![false; stories.len()];
        let mut state = Self {
            status: PlayerStatus::Playing,
            story_index: start_index,
            cursor: PlaybackCursor::at(0),
            muted,
            segment_duration_ms: 0,
            stories,
            notified,
            config,
        };
        state.resolve_duration(None);
        state
    }

    pub fn current_story(&self) -> &Story {
        &self.stories[self.story_index]
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.current_story().segments.get(self.cursor.segment_index)
    }

    /// Fraction of the active segment already played, clamped to [0, 1].
    pub fn progress(&self) -> f32 {
        if self.segment_duration_ms == 0 {
            return 1.0;
        }
        (self.cursor.elapsed_ms as f32 / self.segment_duration_ms as f32).clamp(0.0, 1.0)
    }

    /// One fill fraction per segment of the active story: earlier segments
    /// full, the current one proportional, later ones empty.
    pub fn indicator_fills(&self) -> Vec<f32> {
        let current = self.cursor.segment_index;
        (0..self.current_story().segments.len())
            .map(|i| {
                if i < current {
                    1.0
                } else if i == current {
                    self.progress()
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Entry transition after construction. Empty stories take the
    /// forward-exit path immediately.
    pub fn open(&mut self) -> Step {
        if self.current_story().is_empty() {
            self.forward_exit()
        } else {
            Step::Stay
        }
    }

    /// One animation frame at host timestamp `now_ms`. Accumulates the
    /// wall-clock delta since the previous frame while `Playing`; the first
    /// frame after a segment change or a resume only anchors the timestamp.
    pub fn frame(&mut self, now_ms: u64) -> Step {
        if self.status != PlayerStatus::Playing {
            return Step::Stay;
        }

        if let Some(prev) = self.cursor.last_frame_ms {
            self.cursor.elapsed_ms = self
                .cursor
                .elapsed_ms
                .saturating_add(now_ms.saturating_sub(prev));
        }
        self.cursor.last_frame_ms = Some(now_ms);

        if self.cursor.elapsed_ms >= self.segment_duration_ms {
            let step = self.advance();
            // Timer-driven advances keep the clock continuous: the frame that
            // expired one segment also anchors the next.
            if self.status == PlayerStatus::Playing {
                self.cursor.last_frame_ms = Some(now_ms);
            }
            step
        } else {
            Step::Stay
        }
    }

    /// Move forward: next segment, else next sibling story, else close.
    /// Also the timer-expiry and video-ended path.
    pub fn advance(&mut self) -> Step {
        if self.status == PlayerStatus::Closed {
            return Step::Stay;
        }

        let next = self.cursor.segment_index + 1;
        if next < self.current_story().segments.len() {
            self.enter_segment(next);
            Step::Segment(next)
        } else {
            self.forward_exit()
        }
    }

    /// Move backward: previous segment (restarting it from zero), else the
    /// previous sibling story, else clamp at the first segment with progress
    /// reset. Clamping never closes.
    pub fn retreat(&mut self) -> Step {
        if self.status == PlayerStatus::Closed {
            return Step::Stay;
        }

        if self.cursor.segment_index > 0 {
            let prev = self.cursor.segment_index - 1;
            self.enter_segment(prev);
            return Step::Segment(prev);
        }

        match self.prev_playable_story() {
            Some(index) => {
                self.story_index = index;
                self.enter_segment(0);
                Step::PrevStory(index)
            }
            None => {
                self.cursor = PlaybackCursor::at(0);
                Step::Restarted
            }
        }
    }

    /// Hold-to-pause. Elapsed time freezes; the frame anchor is rebased on
    /// release so the held duration is never counted.
    pub fn hold(&mut self) {
        if self.status == PlayerStatus::Playing {
            self.status = PlayerStatus::Paused;
        }
    }

    pub fn release(&mut self) {
        if self.status == PlayerStatus::Paused {
            self.status = PlayerStatus::Playing;
            self.cursor.last_frame_ms = None;
        }
    }

    /// Orthogonal to playback: flips the flag without touching the cursor.
    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    pub fn close(&mut self) {
        self.status = PlayerStatus::Closed;
    }

    /// Re-resolve the active segment's threshold once mounted media reports
    /// its duration (videos only; images and overrides are unaffected).
    pub fn resolve_duration(&mut self, reported: Option<u64>) {
        self.segment_duration_ms = match self.current_segment() {
            Some(segment) => segment.resolved_duration_ms(reported, &self.config),
            None => 0,
        };
    }

    /// First-view notification bookkeeping: returns the story id the first
    /// time the active story is both unseen and not yet notified in this
    /// player instance.
    pub fn take_first_view(&mut self) -> Option<String> {
        let index = self.story_index;
        if self.stories[index].seen || self.notified[index] {
            return None;
        }
        self.notified[index] = true;
        Some(self.stories[index].id.clone())
    }

    fn enter_segment(&mut self, index: usize) {
        self.cursor = PlaybackCursor::at(index);
        self.resolve_duration(None);
    }

    fn forward_exit(&mut self) -> Step {
        match self.next_playable_story() {
            Some(index) => {
                self.story_index = index;
                self.enter_segment(0);
                Step::NextStory(index)
            }
            None => {
                self.status = PlayerStatus::Closed;
                Step::Close
            }
        }
    }

    fn next_playable_story(&self) -> Option<usize> {
        self.stories
            .iter()
            .enumerate()
            .skip(self.story_index + 1)
            .find(|(_, story)| !story.is_empty())
            .map(|(index, _)| index)
    }

    fn prev_playable_story(&self) -> Option<usize> {
        self.stories
            .iter()
            .enumerate()
            .take(self.story_index)
            .rev()
            .find(|(_, story)| !story.is_empty())
            .map(|(index, _)| index)
    }
}
