use log::{debug, info, warn};
use lumen_model::{QualitySelection, SubtitleSelection};
use tokio::time::Instant;

use super::PlaybackController;
use super::session::{PendingSwitch, SwitchKind};
use crate::error::{PlayerError, PlayerResult};

/// Drift tolerated before a switch puts the playhead back
const POSITION_TOLERANCE_SECONDS: f64 = 0.25;

impl PlaybackController {
    /// Select a quality level. Re-selecting the current value only marks it
    /// as the user's choice.
    pub fn set_quality(&mut self, selection: QualitySelection) -> PlayerResult<()> {
        let now = Instant::now();
        let position = self.progress().0;
        let was_playing = !self.media.paused();
        let timeout = self.config.switching.completion_timeout();

        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        let selection = selection.validated(session.concrete_level_count())?;

        if session.quality_selection == selection {
            session.user_selected_quality = true;
            session.auto_quality_at = None;
            debug!("Quality {} already selected", selection);
            return Ok(());
        }
        if session.is_switching(now) {
            return Err(PlayerError::SwitchInProgress);
        }
        let engine = session.engine_mut().ok_or(PlayerError::NoEngine)?;

        info!("Switching quality to {}", selection);
        engine.set_current_level(selection.engine_level());
        session.quality_selection = selection;
        session.user_selected_quality = true;
        session.auto_quality_at = None;
        session.switch = Some(PendingSwitch {
            kind: SwitchKind::Quality(selection),
            position,
            was_playing,
            deadline: now + timeout,
        });
        Ok(())
    }

    pub fn set_audio_track(&mut self, id: usize) -> PlayerResult<()> {
        let now = Instant::now();
        let position = self.progress().0;
        let was_playing = !self.media.paused();
        let timeout = self.config.switching.completion_timeout();

        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        if !session.audio_tracks.iter().any(|track| track.id == id) {
            return Err(PlayerError::UnknownAudioTrack(id));
        }
        if session.current_audio_track == Some(id) {
            return Ok(());
        }
        if session.is_switching(now) {
            return Err(PlayerError::SwitchInProgress);
        }
        let engine = session.engine_mut().ok_or(PlayerError::NoEngine)?;

        info!("Switching audio track to {}", id);
        engine.set_audio_track(id);
        session.current_audio_track = Some(id);
        session.switch = Some(PendingSwitch {
            kind: SwitchKind::Audio(id),
            position,
            was_playing,
            deadline: now + timeout,
        });
        Ok(())
    }

    /// Select a subtitle language or turn subtitles off. During a pending
    /// switch the selection is applied once the switch completes.
    pub fn set_subtitle_track(
        &mut self,
        selection: SubtitleSelection,
    ) -> PlayerResult<()> {
        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        if session.switch.is_some() {
            session.subtitles.select(selection.clone())?;
        } else {
            session
                .subtitles
                .set_track(selection.clone(), self.media.as_mut())?;
        }
        let label = session.subtitles.describe(&selection);
        self.state.show_track_notification(format!("Subtitles: {label}"));
        Ok(())
    }

    pub fn cycle_audio_track(&mut self) -> PlayerResult<()> {
        let session = self.session.as_ref().ok_or(PlayerError::NoSession)?;
        if session.audio_tracks.len() < 2 {
            return Ok(());
        }
        let current = session
            .current_audio_track
            .and_then(|id| session.audio_tracks.iter().position(|t| t.id == id));
        let next = current.map_or(0, |index| (index + 1) % session.audio_tracks.len());
        let id = session.audio_tracks[next].id;
        self.set_audio_track(id)
    }

    pub fn cycle_subtitle_track(&mut self) -> PlayerResult<()> {
        let session = self.session.as_ref().ok_or(PlayerError::NoSession)?;
        let next = session.subtitles.next_in_cycle();
        self.set_subtitle_track(next)
    }

    pub fn toggle_subtitles(&mut self) -> PlayerResult<()> {
        let session = self.session.as_ref().ok_or(PlayerError::NoSession)?;
        let next = session.subtitles.toggled();
        self.set_subtitle_track(next)
    }

    /// The engine confirmed the switch (or it timed out): restore the
    /// playhead, re-assert subtitles and resume
    pub(crate) fn complete_switch(&mut self) {
        let settle = self.config.switching.settle_delay();
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(switch) = session.switch.take() else {
            return;
        };
        session.settle_until = Some(Instant::now() + settle);
        let message = match switch.kind {
            SwitchKind::Quality(_) => format!("Quality: {}", session.quality_label()),
            SwitchKind::Audio(id) => format!(
                "Audio: {}",
                session.audio_label(id).unwrap_or("Unknown")
            ),
        };

        let current = self.media.current_time();
        if !current.is_finite()
            || (current - switch.position).abs() > POSITION_TOLERANCE_SECONDS
        {
            debug!(
                "Restoring position {:.2}s after switch (was {:.2}s)",
                switch.position, current
            );
            self.media.set_current_time(switch.position);
        }

        self.refresh_subtitles();
        self.state.show_track_notification(message);

        if switch.was_playing && self.media.paused() {
            self.try_play();
        }
    }

    pub(crate) fn check_switch_deadline(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.settle_until.is_some_and(|until| now >= until) {
            session.settle_until = None;
        }
        if let Some(switch) = session.switch
            && now >= switch.deadline
        {
            warn!("Engine never confirmed {:?}, completing anyway", switch.kind);
            self.complete_switch();
        }
    }

    /// End of the startup grace: hand the pinned level back to the
    /// estimator unless the user picked one
    pub(crate) fn apply_auto_quality(&mut self, now: Instant) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Some(due) = session.auto_quality_at else {
            return;
        };
        if now < due || session.switch.is_some() {
            return;
        }
        session.auto_quality_at = None;
        if session.user_selected_quality || session.quality_selection.is_auto() {
            return;
        }
        if let Some(engine) = session.engine_mut() {
            info!("Startup grace elapsed, enabling automatic quality");
            engine.set_current_level(None);
            session.quality_selection = QualitySelection::Auto;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PlaybackSource;
    use crate::player::messages::{MediaEvent, PlayerMessage};
    use crate::testing::{EngineCall, FakeEngineFactory, FakeMediaElement};
    use lumen_config::PlayerConfig;
    use lumen_contracts::events::EngineEvent;
    use std::sync::Arc;
    use std::time::Duration;
    use url::Url;

    async fn started() -> (PlaybackController, FakeMediaElement, FakeEngineFactory)
    {
        let media = FakeMediaElement::new();
        let engines = FakeEngineFactory::with_levels(&[360, 720])
            .with_audio_tracks(&[("English", "en"), ("Deutsch", "de")]);
        let mut controller = PlaybackController::new(
            PlayerConfig::default(),
            Box::new(media.clone()),
            Arc::new(engines.clone()),
        );
        let url = Url::parse("https://cdn.example/show/master.m3u8").unwrap();
        controller
            .load(
                PlaybackSource::new(url.clone())
                    .with_subtitle("en", url.join("en.vtt").unwrap())
                    .with_subtitle("fr", url.join("fr.vtt").unwrap()),
            )
            .await
            .unwrap();
        media.attach_text_tracks(&["en", "fr"]);
        let manifest = engines.latest().unwrap().manifest_parsed();
        controller.update(PlayerMessage::Engine(manifest));
        media.set_duration(300.0);
        controller.update(PlayerMessage::Media(MediaEvent::LoadedMetadata));
        controller.update(PlayerMessage::Media(MediaEvent::Playing));
        (controller, media, engines)
    }

    #[tokio::test(start_paused = true)]
    async fn reselecting_pinned_level_makes_no_engine_call() {
        let (mut controller, _, engines) = started().await;
        let engine = engines.latest().unwrap();
        let before = engine.calls().len();

        controller.set_quality(QualitySelection::Fixed(0)).unwrap();

        assert_eq!(engine.calls().len(), before);
        assert!(controller.session().unwrap().user_selected_quality);
        assert!(!controller.is_switching());
    }

    #[tokio::test(start_paused = true)]
    async fn second_switch_is_refused_while_pending() {
        let (mut controller, _, _) = started().await;
        controller.set_quality(QualitySelection::Fixed(1)).unwrap();
        assert!(matches!(
            controller.set_audio_track(1),
            Err(PlayerError::SwitchInProgress)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn switch_restores_position_and_resumes() {
        let (mut controller, media, _) = started().await;
        media.set_position(120.0);
        controller.set_quality(QualitySelection::Fixed(1)).unwrap();

        // The engine flushes and the element jumps back and pauses
        media.set_position(0.0);
        media.force_pause();
        controller.update(PlayerMessage::Media(MediaEvent::Pause));
        controller.update(PlayerMessage::Engine(EngineEvent::LevelSwitched {
            level: 1,
        }));

        assert_eq!(media.position(), 120.0);
        assert!(!media.is_paused());
        assert_eq!(controller.track_notification(), Some("Quality: 720p"));
    }

    #[tokio::test(start_paused = true)]
    async fn subtitle_choice_waits_for_switch() {
        let (mut controller, media, _) = started().await;
        controller.set_audio_track(1).unwrap();
        controller
            .set_subtitle_track(SubtitleSelection::Language("fr".into()))
            .unwrap();
        assert!(media.showing_tracks().is_empty());

        controller.update(PlayerMessage::Engine(EngineEvent::AudioTrackSwitched {
            id: 1,
        }));
        assert_eq!(media.showing_tracks(), vec!["fr".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn unconfirmed_switch_times_out() {
        let (mut controller, _, _) = started().await;
        controller.set_quality(QualitySelection::Fixed(1)).unwrap();

        tokio::time::advance(Duration::from_millis(5001)).await;
        controller.update(PlayerMessage::Tick);
        assert!(controller.session().unwrap().switch.is_none());

        tokio::time::advance(Duration::from_millis(301)).await;
        controller.update(PlayerMessage::Tick);
        assert!(!controller.is_switching());
    }

    #[tokio::test(start_paused = true)]
    async fn grace_period_enables_auto() {
        let (mut controller, _, engines) = started().await;
        tokio::time::advance(Duration::from_millis(1001)).await;
        controller.update(PlayerMessage::Tick);

        assert_eq!(controller.quality_selection(), Some(QualitySelection::Auto));
        let engine = engines.latest().unwrap();
        assert_eq!(engine.count(|c| *c == EngineCall::SetCurrentLevel(None)), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn audio_cycle_wraps() {
        let (mut controller, _, _) = started().await;
        controller.cycle_audio_track().unwrap();
        assert_eq!(controller.current_audio_track(), Some(1));
        controller.update(PlayerMessage::Engine(EngineEvent::AudioTrackSwitched {
            id: 1,
        }));
        tokio::time::advance(Duration::from_millis(301)).await;
        controller.update(PlayerMessage::Tick);

        controller.cycle_audio_track().unwrap();
        assert_eq!(controller.current_audio_track(), Some(0));
    }
}
