//! Player domain
//!
//! One [`PlaybackController`] per mounted player. It owns the media element
//! handle, at most one stream engine (through [`session::PlaybackSession`])
//! and the watch-position sync. Behaviour is split across the submodules as
//! `impl PlaybackController` blocks:
//!
//! - `session` / `engine_events`: engine lifecycle, manifest, fatal errors
//! - `track_selection` / `subtitles`: quality, audio and subtitle switches
//! - `buffering`: playback state machine, spinner debounce, stall watchdog
//! - `seek`: scrubbing and relative seeks
//! - `watch_sync`: persistence of the resume position
//! - `episodes` / `controls`: transport and sequencing

pub mod buffering;
pub mod controls;
pub mod engine_events;
pub mod episodes;
pub mod messages;
pub mod seek;
pub mod session;
pub mod state;
pub mod subtitles;
pub mod track_selection;
pub mod update;
pub mod watch_sync;

use std::sync::Arc;

use log::{debug, error, info, warn};
use lumen_config::PlayerConfig;
use lumen_contracts::engine::EngineFactory;
use lumen_contracts::error::ContractError;
use lumen_contracts::history::WatchHistory;
use lumen_contracts::media::MediaElement;
use lumen_contracts::playing_flag::{
    GlobalPlayingFlag, PlayingFlag, PlayingFlagGuard,
};
use lumen_model::{
    AudioTrack, EpisodeInfo, ErrorReason, PlaybackState, QualityLevel,
    QualitySelection, ScrubState, SubtitleSelection, SubtitleTrack,
};

use self::messages::PlayerMessage;
use self::session::PlaybackSession;
use self::state::PlayerState;
use self::watch_sync::WatchSync;
use crate::error::PlayerResult;

// Re-export key types
pub use session::PlaybackSource;
pub use state::TrackNotification;

/// Notifications for the host
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// The user navigated back; the session is already torn down
    CloseRequested,
    /// Play the episode at this index of the sequence
    ChangeEpisode(usize),
    StateChanged(PlaybackState),
}

/// Events produced while handling one message
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PlayerUpdateResult {
    pub events: Vec<PlayerEvent>,
}

impl PlayerUpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<PlayerEvent>) -> Self {
        Self { events }
    }

    pub fn contains(&self, event: &PlayerEvent) -> bool {
        self.events.contains(event)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug)]
pub struct PlaybackController {
    pub(crate) config: PlayerConfig,
    pub(crate) media: Box<dyn MediaElement>,
    pub(crate) engines: Arc<dyn EngineFactory>,
    pub(crate) playing_flag: Arc<dyn PlayingFlag>,
    pub(crate) playing_guard: Option<PlayingFlagGuard>,
    pub(crate) state: PlayerState,
    pub(crate) session: Option<PlaybackSession>,
    pub(crate) watch_sync: WatchSync,
    outbox: Vec<PlayerEvent>,
}

impl PlaybackController {
    pub fn new(
        config: PlayerConfig,
        media: Box<dyn MediaElement>,
        engines: Arc<dyn EngineFactory>,
    ) -> Self {
        let watch_sync = WatchSync::new(config.watch_sync.clone(), None);
        let mut state = PlayerState::default();
        state.volume = media.volume();
        state.is_muted = media.muted();

        Self {
            config,
            media,
            engines,
            playing_flag: Arc::new(GlobalPlayingFlag),
            playing_guard: None,
            state,
            session: None,
            watch_sync,
            outbox: Vec::new(),
        }
    }

    pub fn with_watch_history(mut self, history: Arc<dyn WatchHistory>) -> Self {
        self.watch_sync.set_history(history);
        self
    }

    pub fn with_playing_flag(mut self, flag: Arc<dyn PlayingFlag>) -> Self {
        self.playing_flag = flag;
        self
    }

    /// Handle one message and return the events it produced
    pub fn update(&mut self, message: PlayerMessage) -> PlayerUpdateResult {
        update::update_player(self, message)
    }

    /// Start a session for `source`, tearing down the current one first.
    ///
    /// An explicit `start_time` wins; otherwise the last position is fetched
    /// from watch history. The position is applied on `LoadedMetadata`.
    pub async fn load(&mut self, source: PlaybackSource) -> PlayerResult<()> {
        // The old engine must be gone before a new one touches the element
        self.teardown();

        let resume = match (source.start_time, source.watch_target) {
            (Some(start), _) => Some(start),
            (None, Some(target)) => {
                self.watch_sync.fetch_resume_position(target).await
            }
            (None, None) => None,
        };

        self.start_session(source, resume)
    }

    fn start_session(
        &mut self,
        source: PlaybackSource,
        resume: Option<f64>,
    ) -> PlayerResult<()> {
        let resume = resume.filter(|seconds| seconds.is_finite() && *seconds > 0.0);
        self.state.reset();
        self.state.pending_resume_position = resume;
        self.watch_sync.begin(source.watch_target, resume.unwrap_or(0.0));
        self.playing_guard =
            Some(PlayingFlagGuard::new(Arc::clone(&self.playing_flag)));

        match PlaybackSession::start(
            source,
            &self.engines,
            self.config.buffering.startup,
        ) {
            Ok(session) => {
                self.session = Some(session);
                self.transition(PlaybackState::Loading);
                Ok(())
            }
            Err(err) => {
                error!("Failed to create stream engine: {}", err);
                self.transition(PlaybackState::Error {
                    reason: ErrorReason::Fatal {
                        details: err.to_string(),
                    },
                });
                Err(err.into())
            }
        }
    }

    /// Destroy the engine, flush the watch position and clear the playing
    /// flag. Safe to call without a session.
    pub fn unload(&mut self) {
        self.teardown();
        self.state.reset();
        self.transition(PlaybackState::Idle);
    }

    pub(crate) fn teardown(&mut self) {
        if let Some(mut session) = self.session.take() {
            if self.state.has_started {
                let (position, duration) = self.progress();
                self.watch_sync.end(position, duration);
            }
            session.cancel_timers();
            session.destroy_engine();
            info!("Session for {} torn down", session.source.master_url);
        }
        self.watch_sync.cancel();
        self.state.cancel_timers();
        self.playing_guard = None;
    }

    /// Wait for the most recent immediate watch-history write
    pub async fn drain_watch_writes(&mut self) {
        self.watch_sync.drain().await;
    }

    pub(crate) fn transition(&mut self, next: PlaybackState) {
        if self.state.playback != next {
            debug!("Playback state {} -> {}", self.state.playback, next);
            self.state.playback = next.clone();
            self.outbox.push(PlayerEvent::StateChanged(next));
        }
    }

    pub(crate) fn emit(&mut self, event: PlayerEvent) {
        self.outbox.push(event);
    }

    pub(crate) fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Call `play()`, falling back to a click-to-start affordance when the
    /// platform rejects it
    pub(crate) fn try_play(&mut self) -> bool {
        match self.media.play() {
            Ok(()) => {
                self.state.awaiting_gesture = false;
                true
            }
            Err(ContractError::PlayRejected(reason)) => {
                self.on_play_rejected(reason);
                false
            }
            Err(err) => {
                warn!("play() failed: {}", err);
                false
            }
        }
    }

    pub(crate) fn on_play_rejected(&mut self, reason: String) {
        warn!("Playback start rejected, waiting for a user gesture: {}", reason);
        self.state.awaiting_gesture = true;
        if matches!(self.state.playback, PlaybackState::Loading) {
            self.transition(PlaybackState::Paused);
        }
    }

    /// Duration when the element knows it (finite and non-zero)
    pub(crate) fn known_duration(&self) -> Option<f64> {
        let duration = self.media.duration();
        (duration.is_finite() && duration > 0.0).then_some(duration)
    }

    pub(crate) fn progress(&self) -> (f64, f64) {
        let position = self.media.current_time();
        let position = if position.is_finite() {
            position
        } else {
            self.state.last_valid_position
        };
        let duration = self.known_duration().unwrap_or_else(|| {
            if self.state.last_valid_duration > 0.0 {
                self.state.last_valid_duration
            } else {
                f64::NAN
            }
        });
        (position, duration)
    }

    /// Immediate watch write for lifecycle events (pause, episode change)
    pub(crate) fn flush_watch_position(&mut self) {
        if self.state.has_started {
            let (position, duration) = self.progress();
            self.watch_sync.flush(position, duration);
        }
    }

    pub(crate) fn refresh_subtitles(&mut self) {
        if let Some(session) = self.session.as_ref() {
            session.subtitles.refresh(self.media.as_mut());
        }
    }

    // ===== Read-only views for the host =====

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn playback_state(&self) -> &PlaybackState {
        &self.state.playback
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn quality_levels(&self) -> &[QualityLevel] {
        self.session
            .as_ref()
            .map(|session| session.quality_levels.as_slice())
            .unwrap_or_default()
    }

    pub fn quality_selection(&self) -> Option<QualitySelection> {
        self.session.as_ref().map(|session| session.quality_selection)
    }

    pub fn quality_label(&self) -> Option<String> {
        self.session.as_ref().map(PlaybackSession::quality_label)
    }

    pub fn audio_tracks(&self) -> &[AudioTrack] {
        self.session
            .as_ref()
            .map(|session| session.audio_tracks.as_slice())
            .unwrap_or_default()
    }

    pub fn current_audio_track(&self) -> Option<usize> {
        self.session.as_ref().and_then(|session| session.current_audio_track)
    }

    /// Declarative subtitle list for the host to attach
    pub fn subtitle_tracks(&self) -> &[SubtitleTrack] {
        self.session
            .as_ref()
            .map(|session| session.subtitles.track_list())
            .unwrap_or_default()
    }

    pub fn subtitle_selection(&self) -> SubtitleSelection {
        self.session
            .as_ref()
            .map(|session| session.subtitles.selection().clone())
            .unwrap_or_default()
    }

    pub fn scrub_state(&self) -> ScrubState {
        self.state.scrub
    }

    /// Preview position while scrubbing, the media position otherwise
    pub fn displayed_position(&self) -> f64 {
        match self.state.scrub {
            ScrubState::Dragging { preview_time, .. } => preview_time,
            ScrubState::Idle => self.progress().0,
        }
    }

    pub fn duration(&self) -> Option<f64> {
        self.known_duration()
    }

    pub fn is_loading_indicator_visible(&self) -> bool {
        self.state.show_spinner
    }

    pub fn controls_visible(&self) -> bool {
        self.state.controls
    }

    pub fn track_notification(&self) -> Option<&str> {
        self.state
            .track_notification
            .as_ref()
            .map(|notification| notification.message.as_str())
    }

    pub fn retry_available(&self) -> bool {
        self.state.retry_available
    }

    pub fn awaiting_gesture(&self) -> bool {
        self.state.awaiting_gesture
    }

    pub fn is_switching(&self) -> bool {
        let now = tokio::time::Instant::now();
        self.session
            .as_ref()
            .is_some_and(|session| session.is_switching(now))
    }

    pub fn current_episode(&self) -> Option<&EpisodeInfo> {
        self.session
            .as_ref()
            .and_then(|session| session.source.episodes.as_ref())
            .and_then(|episodes| episodes.current())
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.teardown();
    }
}
