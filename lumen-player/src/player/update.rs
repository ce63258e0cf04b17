use log::{debug, warn};
use lumen_contracts::events::EngineEvent;
use tokio::time::Instant;

use super::messages::PlayerMessage;
use super::{PlaybackController, PlayerUpdateResult};
use crate::error::PlayerResult;

/// Handle player messages
pub fn update_player(
    controller: &mut PlaybackController,
    message: PlayerMessage,
) -> PlayerUpdateResult {
    if message.is_user_input() {
        controller.show_controls();
    }

    let outcome: PlayerResult<()> = match message {
        PlayerMessage::Media(event) => {
            controller.handle_media_event(event);
            Ok(())
        }
        PlayerMessage::Engine(event) => {
            controller.handle_engine_event(event);
            Ok(())
        }
        PlayerMessage::RawEngine(raw) => match EngineEvent::from_raw(&raw) {
            Ok(Some(event)) => {
                controller.handle_engine_event(event);
                Ok(())
            }
            Ok(None) => Ok(()),
            Err(err) => {
                warn!("Dropping engine event: {}", err);
                Ok(())
            }
        },
        PlayerMessage::Tick => {
            on_tick(controller, Instant::now());
            Ok(())
        }

        PlayerMessage::Play => {
            controller.play();
            Ok(())
        }
        PlayerMessage::Pause => {
            controller.pause();
            Ok(())
        }
        PlayerMessage::PlayPause => {
            controller.play_pause();
            Ok(())
        }
        PlayerMessage::UserGesture => {
            controller.user_gesture();
            Ok(())
        }
        PlayerMessage::Retry => controller.retry(),
        PlayerMessage::Close => {
            controller.close();
            Ok(())
        }

        PlayerMessage::SeekTo(seconds) => controller.seek_to(seconds),
        PlayerMessage::SeekRelative(delta) => controller.seek_relative(delta),
        PlayerMessage::SeekForward => {
            let step = controller.config.seek.short_step_seconds;
            controller.seek_relative(step)
        }
        PlayerMessage::SeekBackward => {
            let step = controller.config.seek.short_step_seconds;
            controller.seek_relative(-step)
        }
        PlayerMessage::SeekForwardLong => {
            let step = controller.config.seek.long_step_seconds;
            controller.seek_relative(step)
        }
        PlayerMessage::SeekBackwardLong => {
            let step = controller.config.seek.long_step_seconds;
            controller.seek_relative(-step)
        }
        PlayerMessage::ScrubStart { pointer_x, track } => {
            controller.scrub_start(pointer_x, track)
        }
        PlayerMessage::ScrubMove { pointer_x } => {
            controller.scrub_move(pointer_x);
            Ok(())
        }
        PlayerMessage::ScrubEnd { pointer_x } => {
            controller.scrub_end(pointer_x);
            Ok(())
        }
        PlayerMessage::SeekBarClicked { pointer_x, track } => {
            controller.seek_bar_clicked(pointer_x, track)
        }

        PlayerMessage::SetVolume(volume) => {
            controller.set_volume(volume);
            Ok(())
        }
        PlayerMessage::ToggleMute => {
            controller.toggle_mute();
            Ok(())
        }
        PlayerMessage::SetPlaybackSpeed(speed) => {
            controller.set_playback_speed(speed);
            Ok(())
        }

        PlayerMessage::SetQuality(selection) => controller.set_quality(selection),
        PlayerMessage::SetAudioTrack(id) => controller.set_audio_track(id),
        PlayerMessage::SetSubtitleTrack(selection) => {
            controller.set_subtitle_track(selection)
        }
        PlayerMessage::CycleAudioTrack => controller.cycle_audio_track(),
        PlayerMessage::CycleSubtitleTrack => controller.cycle_subtitle_track(),
        PlayerMessage::ToggleSubtitles => controller.toggle_subtitles(),

        PlayerMessage::NextEpisode => controller.next_episode(),
        PlayerMessage::PreviousEpisode => controller.previous_episode(),

        // Handled by the `show_controls` call above
        PlayerMessage::ShowControls | PlayerMessage::MouseMoved => Ok(()),
    };

    // Refusals leave the state untouched; the UI simply does nothing
    if let Err(err) = outcome {
        debug!("Request refused: {}", err);
    }

    PlayerUpdateResult::with_events(controller.take_events())
}

/// Evaluate every deadline that may have passed
fn on_tick(controller: &mut PlaybackController, now: Instant) {
    controller.check_switch_deadline(now);
    controller.apply_auto_quality(now);
    controller.check_buffer_widening(now);
    controller.check_spinner(now);
    controller.run_watchdog(now);
    controller.flush_scrub_preview(now);
    controller.update_overlay();
}

impl PlayerMessage {
    /// Messages caused by the user rather than the platform
    fn is_user_input(&self) -> bool {
        !matches!(
            self,
            PlayerMessage::Media(_)
                | PlayerMessage::Engine(_)
                | PlayerMessage::RawEngine(_)
                | PlayerMessage::Tick
                | PlayerMessage::Close
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeEngineFactory, FakeMediaElement};
    use crate::{PlaybackSource, PlayerEvent};
    use lumen_config::PlayerConfig;
    use lumen_contracts::events::{MANIFEST_PARSED, RawEngineEvent};
    use lumen_model::PlaybackState;
    use serde_json::json;
    use std::sync::Arc;
    use url::Url;

    #[tokio::test(start_paused = true)]
    async fn raw_events_are_adapted() {
        let media = FakeMediaElement::new();
        let mut controller = PlaybackController::new(
            PlayerConfig::default(),
            Box::new(media),
            Arc::new(FakeEngineFactory::default()),
        );
        let url = Url::parse("https://cdn.example/master.m3u8").unwrap();
        let result = controller.load(PlaybackSource::new(url)).await;
        assert!(result.is_ok());

        controller.update(PlayerMessage::RawEngine(RawEngineEvent::new(
            MANIFEST_PARSED,
            json!({ "levels": [{ "height": 1080 }, { "height": 480 }] }),
        )));
        assert_eq!(controller.quality_levels().len(), 3);
        assert_eq!(controller.quality_label().as_deref(), Some("480p"));

        // Malformed payloads are dropped without touching state
        let result = controller.update(PlayerMessage::RawEngine(RawEngineEvent::new(
            MANIFEST_PARSED,
            json!({ "levels": "none" }),
        )));
        assert!(result.is_empty());
        assert_eq!(controller.quality_levels().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn load_reports_state_change() {
        let mut controller = PlaybackController::new(
            PlayerConfig::default(),
            Box::new(FakeMediaElement::new()),
            Arc::new(FakeEngineFactory::default()),
        );
        let url = Url::parse("https://cdn.example/master.m3u8").unwrap();
        controller.load(PlaybackSource::new(url)).await.unwrap();

        // Events raised outside `update` are delivered with the next one
        let result = controller.update(PlayerMessage::Tick);
        assert!(result.contains(&PlayerEvent::StateChanged(PlaybackState::Loading)));
    }
}
