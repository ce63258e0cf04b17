//! Engine event handling and fatal error recovery
//!
//! Each fatal class gets exactly one recovery attempt per healthy stretch
//! of playback: a network reload or a media recovery. A second fatal error
//! of the same class, or any fatal error of another class, tears the engine
//! down and leaves a click-to-retry affordance.

use std::sync::Arc;

use log::{debug, error, info, warn};
use lumen_contracts::engine::{EngineAudioTrack, EngineLevel};
use lumen_contracts::events::{EngineError, EngineErrorKind, EngineEvent};
use lumen_contracts::media::ReadyState;
use lumen_model::{
    ErrorReason, PlaybackState, QualitySelection, RecoveryKind, ScrubState,
};

use super::PlaybackController;
use super::session::SwitchKind;
use super::state::StallSource;
use crate::error::{PlayerError, PlayerResult};

impl PlaybackController {
    pub(crate) fn handle_engine_event(&mut self, event: EngineEvent) {
        if self.session.is_none() {
            debug!("Dropping engine event without a session: {:?}", event);
            return;
        }

        match event {
            EngineEvent::ManifestParsed {
                levels,
                audio_tracks,
            } => self.on_manifest_parsed(&levels, &audio_tracks),
            EngineEvent::LevelSwitched { level } => self.on_level_switched(level),
            EngineEvent::LevelLoading { level } => {
                debug!("Loading level {}", level);
                self.on_engine_starved();
            }
            EngineEvent::BufferFlushed => self.on_engine_starved(),
            EngineEvent::AudioTracksUpdated { tracks } => {
                if let Some(session) = self.session.as_mut() {
                    session.set_audio_tracks(&tracks);
                }
            }
            EngineEvent::AudioTrackSwitched { id } => {
                self.on_audio_track_switched(id)
            }
            EngineEvent::BufferAppended => {
                let engine_stall =
                    self.state.stall_source == Some(StallSource::Engine);
                let recovering = matches!(
                    self.state.playback,
                    PlaybackState::Recovering { .. }
                );
                if engine_stall || recovering {
                    self.resolve_stall();
                }
            }
            EngineEvent::Error(err) => self.on_engine_error(err),
        }
    }

    fn on_manifest_parsed(
        &mut self,
        levels: &[EngineLevel],
        audio_tracks: &[EngineAudioTrack],
    ) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let lowest = session.apply_manifest(levels, audio_tracks);
        info!(
            "Manifest parsed: {} levels, {} audio tracks",
            levels.len(),
            audio_tracks.len()
        );

        let concrete = session.concrete_level_count();
        if session.user_selected_quality {
            // A rebuilt engine forgets the level; re-apply the user's choice
            match session.quality_selection.validated(concrete) {
                Ok(selection) => {
                    if let Some(engine) = session.engine_mut() {
                        engine.set_current_level(selection.engine_level());
                    }
                }
                Err(err) => {
                    warn!("Dropping stale quality selection: {}", err);
                    session.quality_selection = QualitySelection::Auto;
                    session.user_selected_quality = false;
                }
            }
        } else if let Some(lowest) = lowest {
            // Fast first frame: pin the lowest rendition until the grace
            // period hands control to the estimator
            debug!("Pinning startup level {}", lowest);
            session.quality_selection = QualitySelection::Fixed(lowest);
            if let Some(engine) = session.engine_mut() {
                engine.set_current_level(Some(lowest));
            }
        }
    }

    fn on_level_switched(&mut self, level: usize) {
        let completes = match self.session.as_mut() {
            Some(session) => {
                session.resolved_level = Some(level);
                match session.switch.map(|switch| switch.kind) {
                    // Auto settles on whatever level the estimator picks
                    Some(SwitchKind::Quality(QualitySelection::Auto)) => true,
                    Some(SwitchKind::Quality(QualitySelection::Fixed(pinned))) => {
                        pinned == level
                    }
                    _ => false,
                }
            }
            None => false,
        };
        debug!("Level switched to {}", level);
        if completes {
            self.complete_switch();
        } else {
            self.refresh_subtitles();
        }
    }

    fn on_audio_track_switched(&mut self, id: usize) {
        let completes = match self.session.as_mut() {
            Some(session) => {
                session.current_audio_track = Some(id);
                matches!(
                    session.switch,
                    Some(switch) if switch.kind == SwitchKind::Audio(id)
                )
            }
            None => false,
        };
        if completes {
            self.complete_switch();
        } else {
            self.refresh_subtitles();
        }
    }

    /// Flushed buffer or level reload: the element may keep reporting
    /// `playing` while nothing is left to decode. Routine reloads with data
    /// at the playhead are not stalls.
    fn on_engine_starved(&mut self) {
        if !self.state.has_started
            || !self.state.playback.is_nominally_playing()
        {
            return;
        }
        let position = self.media.current_time();
        let starved = !self.media.is_buffered(position)
            && self.media.ready_state() < ReadyState::HaveFutureData;
        if starved {
            self.enter_stall(StallSource::Engine, PlaybackState::Buffering);
        }
    }

    fn on_engine_error(&mut self, err: EngineError) {
        if !err.fatal {
            debug!("Non-fatal engine error ({:?}): {}", err.kind, err.details);
            if err.kind == EngineErrorKind::Network {
                self.enter_stall(StallSource::Engine, PlaybackState::Buffering);
            }
            return;
        }
        warn!("Fatal engine error ({:?}): {}", err.kind, err.details);
        self.handle_fatal(err.kind, err.details);
    }

    pub(crate) fn on_element_error(&mut self, details: String) {
        error!("Media element error: {}", details);
        self.escalate(ErrorReason::Element { details });
    }

    fn handle_fatal(&mut self, kind: EngineErrorKind, details: String) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let attempt = match kind {
            EngineErrorKind::Network if !session.recovery.network => {
                session.recovery.network = true;
                Some(RecoveryKind::NetworkReload)
            }
            EngineErrorKind::Media if !session.recovery.media => {
                session.recovery.media = true;
                Some(RecoveryKind::MediaRecovery)
            }
            _ => None,
        };

        let Some(recovery) = attempt.filter(|_| session.has_engine()) else {
            let reason = match kind {
                EngineErrorKind::Network => ErrorReason::Network { details },
                EngineErrorKind::Media => ErrorReason::Media { details },
                EngineErrorKind::Other => ErrorReason::Fatal { details },
            };
            self.escalate(reason);
            return;
        };

        // Abandon a switch in flight; its confirmation will not come
        session.switch = None;
        if let Some(engine) = session.engine_mut() {
            match recovery {
                RecoveryKind::NetworkReload => {
                    info!("Reloading after fatal network error");
                    engine.start_load(None);
                }
                RecoveryKind::MediaRecovery => {
                    info!("Attempting media error recovery");
                    engine.recover_media_error();
                }
            }
        }
        self.state.stall_since = None;
        self.state.stall_source = None;
        self.transition(PlaybackState::Recovering { kind: recovery });
    }

    /// Terminal error: stop everything and offer a retry
    fn escalate(&mut self, reason: ErrorReason) {
        error!("Playback failed: {}", reason);
        self.flush_watch_position();
        if let Some(session) = self.session.as_mut() {
            session.cancel_timers();
            session.destroy_engine();
        }
        self.state.cancel_timers();
        self.state.scrub = ScrubState::Idle;
        self.state.retry_available = true;
        self.transition(PlaybackState::Error { reason });
    }

    /// Rebuild the engine and resume from the last known position
    pub(crate) fn retry(&mut self) -> PlayerResult<()> {
        if !self.state.retry_available {
            debug!("Retry requested without a failed session");
            return Ok(());
        }
        let engines = Arc::clone(&self.engines);
        let profile = self.config.buffering.startup;
        let resume = self.state.last_valid_position;
        let session = self.session.as_mut().ok_or(PlayerError::NoSession)?;
        session.rebuild_engine(&engines, profile)?;

        info!("Retrying playback from {:.1}s", resume);
        self.state.retry_available = false;
        self.state.has_started = false;
        self.state.awaiting_gesture = false;
        self.state.pending_resume_position = (resume > 0.0).then_some(resume);
        self.transition(PlaybackState::Loading);
        Ok(())
    }
}
