//! Scrubbing and relative seeks
//!
//! While dragging, the progress bar shows `preview_time` and the media
//! element is left alone; the seek happens once, on release. Playback that
//! was running before the drag is resumed explicitly after the commit.

use log::debug;
use lumen_model::ScrubState;
use tokio::time::Instant;

use super::PlaybackController;
use super::messages::TrackGeometry;
use crate::error::{PlayerError, PlayerResult};

impl PlaybackController {
    pub fn scrub_start(
        &mut self,
        pointer_x: f64,
        track: TrackGeometry,
    ) -> PlayerResult<()> {
        let duration = self.known_duration().ok_or(PlayerError::UnknownDuration)?;
        let was_playing = !self.media.paused();
        let preview_time = track.fraction(pointer_x) * duration;

        // Dragging first so the resulting pause is not taken for a user pause
        self.state.scrub = ScrubState::Dragging {
            preview_time,
            was_playing,
        };
        self.state.scrub_track = Some(track);
        self.state.last_scrub_update = Some(Instant::now());
        self.state.pending_scrub_preview = None;
        if was_playing {
            self.media.pause();
        }
        debug!("Scrub started at {:.2}s", preview_time);
        Ok(())
    }

    /// Update the preview, at most once per throttle window. A throttled
    /// update is kept and applied on the next `Tick`.
    pub fn scrub_move(&mut self, pointer_x: f64) {
        let ScrubState::Dragging { was_playing, .. } = self.state.scrub else {
            return;
        };
        let (Some(track), Some(duration)) =
            (self.state.scrub_track, self.known_duration())
        else {
            return;
        };
        let preview_time = track.fraction(pointer_x) * duration;
        let now = Instant::now();
        let throttled = self.state.last_scrub_update.is_some_and(|last| {
            now.saturating_duration_since(last) < self.config.seek.scrub_throttle()
        });

        if throttled {
            self.state.pending_scrub_preview = Some(preview_time);
        } else {
            self.state.scrub = ScrubState::Dragging {
                preview_time,
                was_playing,
            };
            self.state.last_scrub_update = Some(now);
            self.state.pending_scrub_preview = None;
        }
    }

    pub(crate) fn flush_scrub_preview(&mut self, now: Instant) {
        let ScrubState::Dragging { was_playing, .. } = self.state.scrub else {
            return;
        };
        let Some(preview_time) = self.state.pending_scrub_preview else {
            return;
        };
        let due = self.state.last_scrub_update.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.config.seek.scrub_throttle()
        });
        if due {
            self.state.scrub = ScrubState::Dragging {
                preview_time,
                was_playing,
            };
            self.state.last_scrub_update = Some(now);
            self.state.pending_scrub_preview = None;
        }
    }

    /// Commit the drag. Without a release position the latest preview is
    /// used.
    pub fn scrub_end(&mut self, pointer_x: Option<f64>) {
        let ScrubState::Dragging {
            preview_time,
            was_playing,
        } = self.state.scrub
        else {
            return;
        };
        let released = pointer_x.zip(self.state.scrub_track).zip(self.known_duration());
        let target = match released {
            Some(((x, track), duration)) => track.fraction(x) * duration,
            None => self.state.pending_scrub_preview.unwrap_or(preview_time),
        };

        self.state.scrub = ScrubState::Idle;
        self.state.scrub_track = None;
        self.state.last_scrub_update = None;
        self.state.pending_scrub_preview = None;

        self.commit_seek(target);
        if was_playing {
            self.try_play();
        }
    }

    /// Single click on the bar: seek without a drag
    pub fn seek_bar_clicked(
        &mut self,
        pointer_x: f64,
        track: TrackGeometry,
    ) -> PlayerResult<()> {
        let duration = self.known_duration().ok_or(PlayerError::UnknownDuration)?;
        self.seek_to(track.fraction(pointer_x) * duration)
    }

    /// Seek to an absolute position, clamped to the media
    pub fn seek_to(&mut self, seconds: f64) -> PlayerResult<()> {
        self.known_duration().ok_or(PlayerError::UnknownDuration)?;
        if !seconds.is_finite() {
            return Ok(());
        }
        let was_playing = !self.media.paused();
        self.commit_seek(seconds);
        if was_playing && self.media.paused() {
            self.try_play();
        }
        Ok(())
    }

    pub fn seek_relative(&mut self, delta: f64) -> PlayerResult<()> {
        let base = self.progress().0;
        self.seek_to(base + delta)
    }

    /// Clamp, move the playhead and make sure the engine fetches around the
    /// target. Returns the position actually used.
    pub(crate) fn commit_seek(&mut self, target: f64) -> f64 {
        let duration = self.known_duration().unwrap_or(target.max(0.0));
        let target = target.clamp(0.0, duration);

        debug!("Seeking to {:.2}s", target);
        self.media.set_current_time(target);
        self.state.last_valid_position = target;
        self.state.watchdog_position = None;

        if !self.media.is_buffered(target)
            && let Some(engine) =
                self.session.as_mut().and_then(|session| session.engine_mut())
        {
            engine.start_load(Some(target));
        }
        target
    }
}
