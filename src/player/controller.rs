use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Instant,
};

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::{
    config::PlayerConfig,
    media::{MediaFactory, MediaHandle},
    story::{SegmentKind, Story},
};

use super::{
    events::{EventSink, PlayerEvent},
    state::{PlayerState, PlayerStatus, Step},
};

/// Keys the player binds while open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    ArrowLeft,
    ArrowRight,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    pub status: PlayerStatus,
    pub story_id: String,
    pub story_index: usize,
    pub segment_index: usize,
    pub progress: f32,
    pub indicator_fills: Vec<f32>,
    pub muted: bool,
    pub opened_at: DateTime<Utc>,
}

/// Async driver around the pure state machine: owns the frame ticker, the
/// active media handle, and event emission. All transitions serialize on the
/// state mutex, so there is exactly one logical writer at a time.
#[derive(Clone)]
pub struct StoryPlayer {
    state: Arc<Mutex<PlayerState>>,
    media: Arc<Mutex<Option<Box<dyn MediaHandle>>>>,
    factory: Arc<dyn MediaFactory>,
    sink: Arc<dyn EventSink>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    cancel: Arc<Mutex<Option<CancellationToken>>>,
    finished: Arc<AtomicBool>,
    config: PlayerConfig,
    view_id: String,
    origin: Instant,
    opened_at: DateTime<Utc>,
}

impl StoryPlayer {
    pub fn new(
        stories: Vec<Story>,
        start_index: usize,
        muted: bool,
        factory: Arc<dyn MediaFactory>,
        sink: Arc<dyn EventSink>,
        config: PlayerConfig,
    ) -> Result<Self> {
        if stories.is_empty() {
            bail!("story list is empty");
        }
        if start_index >= stories.len() {
            bail!(
                "start index {} out of range for {} stories",
                start_index,
                stories.len()
            );
        }

        let state = PlayerState::new(stories, start_index, muted, config.clone());

        Ok(Self {
            state: Arc::new(Mutex::new(state)),
            media: Arc::new(Mutex::new(None)),
            factory,
            sink,
            ticker: Arc::new(Mutex::new(None)),
            cancel: Arc::new(Mutex::new(None)),
            finished: Arc::new(AtomicBool::new(false)),
            config,
            view_id: Uuid::new_v4().to_string(),
            origin: Instant::now(),
            opened_at: Utc::now(),
        })
    }

    /// Start playback: mount the first segment (or take the forward-exit path
    /// for an empty story) and spawn the frame ticker.
    pub async fn open(&self) -> Result<PlayerSnapshot> {
        let step = self.state.lock().await.open();
        match step {
            Step::Stay => {
                self.mount_current().await;
                self.emit_first_view().await;
            }
            other => self.dispatch(other, false).await,
        }

        if self.state.lock().await.status != PlayerStatus::Closed {
            self.spawn_ticker().await;
            info!("story view {} opened", self.view_id);
        }

        Ok(self.snapshot().await)
    }

    pub async fn snapshot(&self) -> PlayerSnapshot {
        let state = self.state.lock().await;
        PlayerSnapshot {
            status: state.status,
            story_id: state.current_story().id.clone(),
            story_index: state.story_index,
            segment_index: state.cursor.segment_index,
            progress: state.progress(),
            indicator_fills: state.indicator_fills(),
            muted: state.muted,
            opened_at: self.opened_at,
        }
    }

    /// Right tap zone / ArrowRight: advance immediately, bypassing the timer.
    pub async fn tap_forward(&self) {
        let step = self.state.lock().await.advance();
        self.dispatch(step, false).await;
    }

    /// Left tap zone / ArrowLeft.
    pub async fn tap_back(&self) {
        let step = self.state.lock().await.retreat();
        self.dispatch(step, false).await;
    }

    /// Press-and-hold pause layer.
    pub async fn pointer_down(&self) {
        self.state.lock().await.hold();
        if let Some(handle) = self.media.lock().await.as_mut() {
            handle.pause();
        }
    }

    pub async fn pointer_up(&self) {
        self.resume().await;
    }

    /// Pointer leaving the interactive surface releases the hold as well.
    pub async fn pointer_leave(&self) {
        self.resume().await;
    }

    pub async fn handle_key(&self, key: Key) {
        match key {
            Key::Escape => self.close().await,
            Key::ArrowLeft => self.tap_back().await,
            Key::ArrowRight => self.tap_forward().await,
        }
    }

    /// Flips mute on the active media element without touching the cursor.
    pub async fn toggle_mute(&self) -> bool {
        let muted = self.state.lock().await.toggle_mute();
        if let Some(handle) = self.media.lock().await.as_mut() {
            handle.set_muted(muted);
        }
        self.sink.emit(PlayerEvent::MuteToggled { muted });
        muted
    }

    /// Host signal that the mounted video reached its natural end. Treated
    /// like timer expiry, ignored while paused.
    pub async fn media_ended(&self) {
        let step = {
            let mut state = self.state.lock().await;
            if state.status != PlayerStatus::Playing {
                return;
            }
            state.advance()
        };
        self.dispatch(step, false).await;
    }

    pub async fn close(&self) {
        self.finish(false).await;
    }

    async fn resume(&self) {
        let was_paused = {
            let mut state = self.state.lock().await;
            let paused = state.status == PlayerStatus::Paused;
            state.release();
            paused
        };
        if !was_paused {
            return;
        }

        let is_video = {
            let state = self.state.lock().await;
            state
                .current_segment()
                .map(|segment| segment.kind == SegmentKind::Video)
                .unwrap_or(false)
        };
        if is_video {
            if let Some(handle) = self.media.lock().await.as_mut() {
                if let Err(err) = handle.play() {
                    debug!("view {}: playback restart rejected: {err:#}", self.view_id);
                }
            }
        }
    }

    async fn dispatch(&self, step: Step, from_ticker: bool) {
        match step {
            Step::Stay | Step::Restarted => {}
            Step::Segment(index) => {
                self.remount().await;
                debug!("view {}: segment {}", self.view_id, index);
            }
            Step::NextStory(_) | Step::PrevStory(_) => {
                self.remount().await;
                let story_id = self.state.lock().await.current_story().id.clone();
                let event = if matches!(step, Step::NextStory(_)) {
                    PlayerEvent::NextStory {
                        story_id: story_id.clone(),
                    }
                } else {
                    PlayerEvent::PrevStory {
                        story_id: story_id.clone(),
                    }
                };
                self.sink.emit(event);
                self.emit_first_view().await;
                info!("view {}: switched to story {}", self.view_id, story_id);
            }
            Step::Close => self.finish(from_ticker).await,
        }
    }

    async fn emit_first_view(&self) {
        if let Some(story_id) = self.state.lock().await.take_first_view() {
            self.sink.emit(PlayerEvent::FirstView { story_id });
        }
    }

    async fn remount(&self) {
        self.unmount_current().await;
        self.mount_current().await;
    }

    async fn mount_current(&self) {
        let handle = {
            let mut state = self.state.lock().await;
            let story = state.current_story().clone();
            let segment = match state.current_segment() {
                Some(segment) => segment.clone(),
                None => return,
            };

            match self.factory.mount(&story, &segment) {
                Ok(mut handle) => {
                    handle.set_muted(state.muted);
                    state.resolve_duration(handle.duration_ms());
                    if segment.kind == SegmentKind::Video && segment.autoplay {
                        // Autoplay rejection must not stall the story; the
                        // timer remains the sole authority for progression.
                        if let Err(err) = handle.play() {
                            debug!("view {}: autoplay rejected: {err:#}", self.view_id);
                        }
                    }
                    Some(handle)
                }
                Err(err) => {
                    warn!(
                        "view {}: failed to mount segment {}: {err:#}",
                        self.view_id, segment.source
                    );
                    None
                }
            }
        };

        *self.media.lock().await = handle;
    }

    async fn unmount_current(&self) {
        if let Some(mut handle) = self.media.lock().await.take() {
            handle.pause();
            handle.unload();
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let token = CancellationToken::new();
        *self.cancel.lock().await = Some(token.clone());

        let player = self.clone();
        let frame_interval = self.config.frame_interval;

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let now_ms = player.origin.elapsed().as_millis() as u64;
                        let step = {
                            let mut state = player.state.lock().await;
                            if state.status == PlayerStatus::Closed {
                                break;
                            }
                            state.frame(now_ms)
                        };
                        player.dispatch(step, true).await;
                        if step == Step::Close {
                            break;
                        }
                    }
                    _ = token.cancelled() => break,
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    /// Single teardown path, idempotent. Cancels the ticker and detaches the
    /// media before the close event fires, so nothing can mutate state for a
    /// removed segment afterwards.
    async fn finish(&self, from_ticker: bool) {
        if self.finished.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(token) = self.cancel.lock().await.take() {
            token.cancel();
        }
        if !from_ticker {
            if let Some(handle) = self.ticker.lock().await.take() {
                handle.abort();
            }
        }

        self.state.lock().await.close();
        self.unmount_current().await;

        info!("story view {} closed", self.view_id);
        self.sink.emit(PlayerEvent::Closed);
    }
}
