//! Playback state machine
//!
//! Transitions come from the union of media element events and engine
//! events (see `engine_events`). Neither side alone is reliable: the element
//! under-reports network starvation, the engine under-reports decoder
//! stalls. Spinner and watchdog deadlines are evaluated on `Tick`.

use log::{debug, info, warn};
use lumen_model::PlaybackState;
use tokio::time::Instant;

use super::messages::MediaEvent;
use super::state::StallSource;
use super::{PlaybackController, PlayerEvent};

impl PlaybackController {
    pub(crate) fn handle_media_event(&mut self, event: MediaEvent) {
        match event {
            MediaEvent::LoadedMetadata => self.on_loaded_metadata(),
            MediaEvent::CanPlay => {
                if self.state.stall_source == Some(StallSource::Media) {
                    self.resolve_stall();
                }
            }
            MediaEvent::Play => {
                self.state.awaiting_gesture = false;
            }
            MediaEvent::Playing => self.on_playing(),
            MediaEvent::Pause => self.on_pause(),
            MediaEvent::Waiting => {
                self.enter_stall(StallSource::Media, PlaybackState::Buffering)
            }
            MediaEvent::Stalled => {
                self.enter_stall(StallSource::Media, PlaybackState::Stalled)
            }
            MediaEvent::TimeUpdate => self.on_time_update(),
            MediaEvent::Seeked => {
                debug!("Seeked to {:.2}s", self.media.current_time());
            }
            MediaEvent::Ended => self.on_ended(),
            MediaEvent::Error(details) => self.on_element_error(details),
            MediaEvent::TextTracksChanged => self.refresh_subtitles(),
            MediaEvent::PlayRejected(reason) => self.on_play_rejected(reason),
        }
    }

    fn on_loaded_metadata(&mut self) {
        let duration = self.known_duration();
        if let Some(duration) = duration {
            self.state.last_valid_duration = duration;
        }

        if let Some(start) = self.state.pending_resume_position.take() {
            let target = duration.map_or(start, |d| start.min(d));
            info!("Resuming playback at {:.1}s", target);
            self.media.set_current_time(target);
            self.state.last_valid_position = target;
        }

        self.refresh_subtitles();

        if self.config.startup.autoplay && self.media.paused() {
            self.try_play();
        }
    }

    fn on_playing(&mut self) {
        let now = Instant::now();
        self.state.awaiting_gesture = false;

        if let PlaybackState::Recovering { kind } = &self.state.playback {
            info!("Recovered from fatal error ({:?})", kind);
            if let Some(session) = self.session.as_mut() {
                session.recovery.reset();
            }
        }

        if !self.state.has_started {
            self.state.has_started = true;
            self.state.watchdog_due =
                Some(now + self.config.buffering.watchdog_interval());
            if let Some(session) = self.session.as_mut() {
                session.widen_at = Some(now + self.config.buffering.widen_delay());
                if !session.user_selected_quality {
                    session.auto_quality_at =
                        Some(now + self.config.startup.auto_quality_grace());
                }
            }
            info!("First frame after {:?}", self.state.playback);
        }

        self.clear_stall();
        self.transition(PlaybackState::Playing);
    }

    fn on_pause(&mut self) {
        // Pauses issued by scrubbing or a track switch are not user pauses
        let switching = self
            .session
            .as_ref()
            .is_some_and(|session| session.switch.is_some());
        if self.state.scrub.is_dragging() || switching {
            return;
        }
        self.clear_stall();
        match self.state.playback {
            PlaybackState::Idle
            | PlaybackState::Ended
            | PlaybackState::Error { .. } => {}
            _ => self.transition(PlaybackState::Paused),
        }
        self.flush_watch_position();
    }

    fn on_time_update(&mut self) {
        if self.state.scrub.is_dragging() {
            return;
        }
        let position = self.media.current_time();
        if !position.is_finite() {
            return;
        }
        self.state.last_valid_position = position;
        let duration = self.known_duration();
        if let Some(duration) = duration {
            self.state.last_valid_duration = duration;
        }

        let switching = self
            .session
            .as_ref()
            .is_some_and(|session| session.switch.is_some());
        if self.state.has_started && !switching {
            self.watch_sync
                .record(position, duration.unwrap_or(f64::NAN));
        }
    }

    fn on_ended(&mut self) {
        self.clear_stall();
        if let Some(duration) = self.known_duration()
            && self.state.has_started
        {
            self.watch_sync.flush(duration, duration);
        }
        self.transition(PlaybackState::Ended);

        // Park at the start rather than at end-of-stream
        self.media.set_current_time(0.0);
        self.state.last_valid_position = 0.0;

        let next = self
            .session
            .as_ref()
            .and_then(|session| session.source.episodes.as_ref())
            .and_then(|episodes| episodes.next_index());
        if let Some(next) = next {
            info!("Auto-advancing to episode {}", next);
            self.emit(PlayerEvent::ChangeEpisode(next));
        }
    }

    /// Register a stall. Before the first frame nothing changes: the
    /// initial load never shows the spinner.
    pub(crate) fn enter_stall(
        &mut self,
        source: StallSource,
        state: PlaybackState,
    ) {
        if !self.state.has_started || self.state.scrub.is_dragging() {
            return;
        }
        match self.state.playback {
            PlaybackState::Playing
            | PlaybackState::Buffering
            | PlaybackState::Stalled => {}
            _ => return,
        }
        if self.state.stall_since.is_none() {
            self.state.stall_since = Some(Instant::now());
        }
        // A media-side stall outranks an engine-side one
        if self.state.stall_source != Some(StallSource::Media) {
            self.state.stall_source = Some(source);
        }
        self.transition(state);
    }

    /// Data is flowing again
    pub(crate) fn resolve_stall(&mut self) {
        let recovering =
            matches!(self.state.playback, PlaybackState::Recovering { .. });
        if !self.state.playback.is_waiting_for_data() && !recovering {
            return;
        }
        self.clear_stall();
        if self.media.paused() {
            self.transition(PlaybackState::Paused);
        } else {
            if recovering && let Some(session) = self.session.as_mut() {
                info!("Playback resumed after recovery");
                session.recovery.reset();
            }
            self.transition(PlaybackState::Playing);
        }
    }

    pub(crate) fn clear_stall(&mut self) {
        self.state.stall_since = None;
        self.state.stall_source = None;
        if self.state.show_spinner {
            debug!("Hiding loading indicator");
        }
        self.state.show_spinner = false;
    }

    /// Show the spinner once a stall has outlived the debounce window
    pub(crate) fn check_spinner(&mut self, now: Instant) {
        if self.state.show_spinner || !self.state.playback.is_waiting_for_data()
        {
            return;
        }
        if let Some(since) = self.state.stall_since
            && now.saturating_duration_since(since)
                >= self.config.buffering.spinner_debounce()
        {
            debug!("Stall persisted, showing loading indicator");
            self.state.show_spinner = true;
        }
    }

    /// Nudge the playhead past a stuck frame when the position has not
    /// moved for a whole watchdog period while nominally playing
    pub(crate) fn run_watchdog(&mut self, now: Instant) {
        let Some(due) = self.state.watchdog_due else {
            return;
        };
        if now < due {
            return;
        }
        self.state.watchdog_due =
            Some(now + self.config.buffering.watchdog_interval());

        let switching = self
            .session
            .as_ref()
            .is_some_and(|session| session.is_switching(now));
        let nominally_playing = self.state.playback.is_nominally_playing()
            && !self.media.paused()
            && !self.state.scrub.is_dragging()
            && !switching;
        if !nominally_playing {
            self.state.watchdog_position = None;
            return;
        }

        let position = self.media.current_time();
        if self.state.watchdog_position == Some(position) {
            let nudged = position + self.config.buffering.stall_nudge_seconds;
            let nudged = self.known_duration().map_or(nudged, |d| nudged.min(d));
            warn!(
                "Playback stuck at {:.2}s, nudging to {:.2}s",
                position, nudged
            );
            self.media.set_current_time(nudged);
            self.state.watchdog_position = Some(nudged);
        } else {
            self.state.watchdog_position = Some(position);
        }
    }

    /// Widen the buffer windows once playback has settled
    pub(crate) fn check_buffer_widening(&mut self, now: Instant) {
        let relaxed = self.config.buffering.relaxed;
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(widen_at) = session.widen_at else {
            return;
        };
        if now < widen_at {
            return;
        }
        session.widen_at = None;
        if let Some(engine) = session.engine_mut() {
            info!(
                "Widening buffer to {:.0}s/{:.0}s",
                relaxed.max_buffer_length, relaxed.max_max_buffer_length
            );
            engine.set_buffer_profile(relaxed);
            session.buffer_profile = relaxed;
        }
    }
}
