use lumen_model::{PlaybackState, ScrubState};
use std::time::Duration;
use tokio::time::Instant;

use super::messages::TrackGeometry;

/// Controller state that is not tied to the engine: what the UI renders
/// plus the deadlines driven by `Tick`.
#[derive(Debug)]
pub struct PlayerState {
    pub playback: PlaybackState,
    /// First `Playing` has been observed for the current source
    pub has_started: bool,
    /// `play()` was rejected; the next user gesture retries it
    pub awaiting_gesture: bool,
    pub retry_available: bool,
    /// Position to apply on `LoadedMetadata`
    pub pending_resume_position: Option<f64>,
    pub last_valid_position: f64,
    pub last_valid_duration: f64,

    // Buffering
    pub stall_since: Option<Instant>,
    pub stall_source: Option<StallSource>,
    pub show_spinner: bool,
    pub watchdog_due: Option<Instant>,
    pub watchdog_position: Option<f64>,

    // Scrubbing
    pub scrub: ScrubState,
    pub scrub_track: Option<TrackGeometry>,
    pub last_scrub_update: Option<Instant>,
    pub pending_scrub_preview: Option<f64>,

    // Controls visibility
    pub controls: bool,
    pub controls_time: Instant,

    // Player settings
    pub volume: f64,
    pub is_muted: bool,
    pub playback_speed: f64,

    pub track_notification: Option<TrackNotification>,
}

/// Which side reported the current stall; each side clears its own
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StallSource {
    /// `waiting`/`stalled` from the media element
    Media,
    /// Flushed buffer, level reload or transient network error
    Engine,
}

#[derive(Debug, Clone)]
pub struct TrackNotification {
    pub message: String,
    pub show_time: Instant,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            playback: PlaybackState::Idle,
            has_started: false,
            awaiting_gesture: false,
            retry_available: false,
            pending_resume_position: None,
            last_valid_position: 0.0,
            last_valid_duration: 0.0,
            stall_since: None,
            stall_source: None,
            show_spinner: false,
            watchdog_due: None,
            watchdog_position: None,
            scrub: ScrubState::Idle,
            scrub_track: None,
            last_scrub_update: None,
            pending_scrub_preview: None,
            controls: true,
            controls_time: Instant::now(),
            volume: 1.0,
            is_muted: false,
            playback_speed: 1.0,
            track_notification: None,
        }
    }
}

impl PlayerState {
    /// Forget everything tied to the current source. Volume, mute and speed
    /// carry over to the next source.
    pub fn reset(&mut self) {
        self.playback = PlaybackState::Idle;
        self.has_started = false;
        self.awaiting_gesture = false;
        self.retry_available = false;
        self.pending_resume_position = None;
        self.last_valid_position = 0.0;
        self.last_valid_duration = 0.0;
        self.scrub = ScrubState::Idle;
        self.scrub_track = None;
        self.controls = true;
        self.controls_time = Instant::now();
        self.cancel_timers();
    }

    /// Drop every pending deadline
    pub fn cancel_timers(&mut self) {
        self.stall_since = None;
        self.stall_source = None;
        self.show_spinner = false;
        self.watchdog_due = None;
        self.watchdog_position = None;
        self.last_scrub_update = None;
        self.pending_scrub_preview = None;
        self.track_notification = None;
    }

    pub fn update_controls(
        &mut self,
        in_use: bool,
        is_playing: bool,
        auto_hide: Duration,
    ) {
        if in_use || !is_playing {
            self.controls = true;
            self.controls_time = Instant::now();
        } else if self.controls && self.controls_time.elapsed() > auto_hide {
            self.controls = false;
        }
    }

    pub fn show_track_notification(&mut self, message: String) {
        self.track_notification = Some(TrackNotification {
            message,
            show_time: Instant::now(),
        });
    }

    pub fn update_track_notification(&mut self, lifetime: Duration) {
        if let Some(notification) = &self.track_notification
            && notification.show_time.elapsed() > lifetime
        {
            self.track_notification = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn controls_hide_only_while_playing() {
        let mut state = PlayerState::default();
        let auto_hide = Duration::from_secs(3);

        tokio::time::advance(Duration::from_secs(4)).await;
        state.update_controls(false, false, auto_hide);
        assert!(state.controls, "paused playback keeps controls up");

        tokio::time::advance(Duration::from_secs(4)).await;
        state.update_controls(false, true, auto_hide);
        assert!(!state.controls);

        state.update_controls(true, true, auto_hide);
        assert!(state.controls);
    }

    #[tokio::test(start_paused = true)]
    async fn notification_expires() {
        let mut state = PlayerState::default();
        state.show_track_notification("Audio: English".into());

        tokio::time::advance(Duration::from_millis(1500)).await;
        state.update_track_notification(Duration::from_secs(2));
        assert!(state.track_notification.is_some());

        tokio::time::advance(Duration::from_millis(600)).await;
        state.update_track_notification(Duration::from_secs(2));
        assert!(state.track_notification.is_none());
    }
}
