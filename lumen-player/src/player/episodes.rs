use log::{debug, info};

use super::{PlaybackController, PlayerEvent};
use crate::error::{PlayerError, PlayerResult};

impl PlaybackController {
    /// Ask the host to play the next episode, if there is one
    pub fn next_episode(&mut self) -> PlayerResult<()> {
        let session = self.session.as_ref().ok_or(PlayerError::NoSession)?;
        let Some(next) = session
            .source
            .episodes
            .as_ref()
            .and_then(|episodes| episodes.next_index())
        else {
            debug!("No next episode");
            return Ok(());
        };

        self.flush_watch_position();
        info!("Changing to episode {}", next);
        self.emit(PlayerEvent::ChangeEpisode(next));
        Ok(())
    }

    /// Restart the current episode once enough of it was watched (or when
    /// it is the first one), otherwise go back one episode
    pub fn previous_episode(&mut self) -> PlayerResult<()> {
        let session = self.session.as_ref().ok_or(PlayerError::NoSession)?;
        let previous = session
            .source
            .episodes
            .as_ref()
            .and_then(|episodes| episodes.previous_index());

        let (position, duration) = self.progress();
        let ratio = if duration.is_finite() && duration > 0.0 {
            position / duration
        } else {
            1.0
        };

        match previous {
            Some(previous) if ratio < self.config.controls.previous_restart_ratio => {
                self.flush_watch_position();
                info!("Changing to episode {}", previous);
                self.emit(PlayerEvent::ChangeEpisode(previous));
                Ok(())
            }
            _ => {
                debug!("Restarting current episode from {:.1}s", position);
                self.seek_relative(-position)
            }
        }
    }
}
