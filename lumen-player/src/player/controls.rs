//! Transport controls, volume and overlay visibility

use log::{debug, info};
use lumen_model::PlaybackState;

use super::{PlaybackController, PlayerEvent};

/// Rates the element is known to handle without audio artifacts
const PLAYBACK_SPEED_RANGE: (f64, f64) = (0.25, 4.0);

impl PlaybackController {
    pub fn play(&mut self) {
        if self.session.is_none() {
            return;
        }
        if matches!(self.state.playback, PlaybackState::Ended) {
            self.media.set_current_time(0.0);
        }
        self.try_play();
    }

    /// State follows the element's `pause` event
    pub fn pause(&mut self) {
        if self.session.is_some() {
            self.media.pause();
        }
    }

    pub fn play_pause(&mut self) {
        if self.media.paused() {
            self.play();
        } else {
            self.pause();
        }
    }

    /// Any click or key press. Retries playback the platform refused
    /// without one.
    pub fn user_gesture(&mut self) {
        if self.state.awaiting_gesture {
            debug!("User gesture received, retrying play()");
            self.try_play();
        }
    }

    pub fn set_volume(&mut self, volume: f64) {
        let volume = if volume.is_finite() {
            volume.clamp(0.0, 1.0)
        } else {
            self.state.volume
        };
        self.state.volume = volume;
        self.media.set_volume(volume);
        // Dragging the slider up unmutes
        if volume > 0.0 && self.state.is_muted {
            self.state.is_muted = false;
            self.media.set_muted(false);
        }
    }

    pub fn toggle_mute(&mut self) {
        self.state.is_muted = !self.state.is_muted;
        self.media.set_muted(self.state.is_muted);
    }

    pub fn set_playback_speed(&mut self, speed: f64) {
        if !speed.is_finite() {
            return;
        }
        let (min, max) = PLAYBACK_SPEED_RANGE;
        let speed = speed.clamp(min, max);
        self.state.playback_speed = speed;
        self.media.set_playback_rate(speed);
        self.state.show_track_notification(format!("Speed: {speed}x"));
    }

    pub fn show_controls(&mut self) {
        let playing = self.state.playback.is_nominally_playing();
        self.state
            .update_controls(true, playing, self.config.controls.auto_hide());
    }

    pub(crate) fn update_overlay(&mut self) {
        let playing = self.state.playback.is_nominally_playing();
        self.state
            .update_controls(false, playing, self.config.controls.auto_hide());
        self.state
            .update_track_notification(self.config.controls.notification());
    }

    /// Leave the player: persist the position, destroy the engine and tell
    /// the host to navigate away
    pub fn close(&mut self) {
        info!("Closing player");
        self.teardown();
        self.state.reset();
        self.transition(PlaybackState::Idle);
        self.emit(PlayerEvent::CloseRequested);
    }
}
