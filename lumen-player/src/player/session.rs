//! Stream session: the engine bound to the media element plus everything
//! learned from the manifest for one source.

use std::collections::BTreeMap;
use std::sync::Arc;

use log::{debug, info};
use lumen_contracts::engine::{
    EngineAudioTrack, EngineFactory, EngineLevel, StreamEngine,
};
use lumen_contracts::error::ContractError;
use lumen_model::{
    AudioTrack, BufferProfile, EpisodeContext, QualityLevel,
    QualitySelection, WatchTarget,
};
use tokio::time::Instant;
use url::Url;

use super::subtitles::SubtitleManager;

/// Everything a host hands the player for one piece of content
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackSource {
    pub master_url: Url,
    /// Language code to subtitle file
    pub subtitle_urls: BTreeMap<String, Url>,
    /// Explicit resume point; wins over the watch-history position
    pub start_time: Option<f64>,
    pub watch_target: Option<WatchTarget>,
    pub episodes: Option<EpisodeContext>,
}

impl PlaybackSource {
    pub fn new(master_url: Url) -> Self {
        Self {
            master_url,
            subtitle_urls: BTreeMap::new(),
            start_time: None,
            watch_target: None,
            episodes: None,
        }
    }

    pub fn with_subtitle(mut self, language: impl Into<String>, url: Url) -> Self {
        self.subtitle_urls.insert(language.into(), url);
        self
    }

    pub fn with_start_time(mut self, seconds: f64) -> Self {
        self.start_time = Some(seconds);
        self
    }

    pub fn with_watch_target(mut self, target: WatchTarget) -> Self {
        self.watch_target = Some(target);
        self
    }

    pub fn with_episodes(mut self, episodes: EpisodeContext) -> Self {
        self.episodes = Some(episodes);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchKind {
    Quality(QualitySelection),
    Audio(usize),
}

/// A quality or audio switch waiting for the engine to confirm it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingSwitch {
    pub kind: SwitchKind,
    /// Position captured before the engine was touched
    pub position: f64,
    pub was_playing: bool,
    pub deadline: Instant,
}

/// One-shot recovery bookkeeping for fatal engine errors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecoveryAttempts {
    pub network: bool,
    pub media: bool,
}

impl RecoveryAttempts {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug)]
pub struct PlaybackSession {
    pub source: PlaybackSource,
    engine: Option<Box<dyn StreamEngine>>,

    /// Auto pseudo level first, then one entry per concrete level
    pub quality_levels: Vec<QualityLevel>,
    pub quality_selection: QualitySelection,
    pub user_selected_quality: bool,
    /// Level the engine actually plays, from `LevelSwitched`
    pub resolved_level: Option<usize>,

    pub audio_tracks: Vec<AudioTrack>,
    pub current_audio_track: Option<usize>,

    pub subtitles: SubtitleManager,

    pub switch: Option<PendingSwitch>,
    pub settle_until: Option<Instant>,
    pub recovery: RecoveryAttempts,

    pub buffer_profile: BufferProfile,
    pub widen_at: Option<Instant>,
    pub auto_quality_at: Option<Instant>,
}

impl PlaybackSession {
    /// Build a fresh engine for `source` and start loading the manifest.
    /// Any previous engine must already be destroyed.
    pub fn start(
        source: PlaybackSource,
        engines: &Arc<dyn EngineFactory>,
        profile: BufferProfile,
    ) -> Result<Self, ContractError> {
        let engine = Self::create_engine(&source.master_url, engines, profile)?;
        let mut subtitles = SubtitleManager::default();
        subtitles.initialize(&source.subtitle_urls);

        info!(
            "Session started for {} ({} subtitle tracks)",
            source.master_url,
            source.subtitle_urls.len()
        );

        Ok(Self {
            source,
            engine: Some(engine),
            quality_levels: Vec::new(),
            quality_selection: QualitySelection::Auto,
            user_selected_quality: false,
            resolved_level: None,
            audio_tracks: Vec::new(),
            current_audio_track: None,
            subtitles,
            switch: None,
            settle_until: None,
            recovery: RecoveryAttempts::default(),
            buffer_profile: profile,
            widen_at: None,
            auto_quality_at: None,
        })
    }

    fn create_engine(
        url: &Url,
        engines: &Arc<dyn EngineFactory>,
        profile: BufferProfile,
    ) -> Result<Box<dyn StreamEngine>, ContractError> {
        let mut engine = engines.create(profile)?;
        engine.attach_media();
        engine.load_source(url);
        Ok(engine)
    }

    /// Replace a destroyed engine, keeping the source and track state
    pub fn rebuild_engine(
        &mut self,
        engines: &Arc<dyn EngineFactory>,
        profile: BufferProfile,
    ) -> Result<(), ContractError> {
        self.destroy_engine();
        let engine =
            Self::create_engine(&self.source.master_url, engines, profile)?;
        self.engine = Some(engine);
        self.buffer_profile = profile;
        self.recovery.reset();
        self.switch = None;
        self.settle_until = None;
        self.widen_at = None;
        self.auto_quality_at = None;
        self.resolved_level = None;
        Ok(())
    }

    pub fn engine_mut(&mut self) -> Option<&mut (dyn StreamEngine + 'static)> {
        self.engine.as_deref_mut()
    }

    pub fn has_engine(&self) -> bool {
        self.engine.is_some()
    }

    pub fn destroy_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            debug!("Destroying stream engine for {}", self.source.master_url);
            engine.stop_load();
            engine.destroy();
        }
    }

    /// Drop every session deadline
    pub fn cancel_timers(&mut self) {
        self.switch = None;
        self.settle_until = None;
        self.widen_at = None;
        self.auto_quality_at = None;
    }

    /// Populate levels and audio tracks from a parsed manifest. Returns the
    /// index of the lowest concrete level, if any.
    pub fn apply_manifest(
        &mut self,
        levels: &[EngineLevel],
        audio_tracks: &[EngineAudioTrack],
    ) -> Option<usize> {
        self.quality_levels = std::iter::once(QualityLevel::auto())
            .chain(levels.iter().enumerate().map(|(index, level)| {
                let mut quality =
                    QualityLevel::concrete(index, level.height, level.bitrate);
                if quality.height.is_none()
                    && let Some(name) = level.name.as_ref().filter(|n| !n.is_empty())
                {
                    quality.label = name.clone();
                }
                quality
            }))
            .collect();

        self.set_audio_tracks(audio_tracks);

        levels
            .iter()
            .enumerate()
            .min_by_key(|(index, level)| {
                (
                    level.height.unwrap_or(0),
                    level.bitrate.unwrap_or(0),
                    *index,
                )
            })
            .map(|(index, _)| index)
    }

    pub fn set_audio_tracks(&mut self, tracks: &[EngineAudioTrack]) {
        self.audio_tracks = tracks
            .iter()
            .map(|track| {
                AudioTrack::new(
                    track.id,
                    track.name.clone(),
                    track.language.clone(),
                )
            })
            .collect();

        let current_still_listed = self
            .current_audio_track
            .is_some_and(|id| self.audio_tracks.iter().any(|t| t.id == id));
        if !current_still_listed {
            self.current_audio_track = self.audio_tracks.first().map(|t| t.id);
        }
    }

    pub fn concrete_level_count(&self) -> usize {
        self.quality_levels.iter().filter(|l| !l.is_auto()).count()
    }

    pub fn level_label(&self, index: usize) -> Option<&str> {
        self.quality_levels
            .iter()
            .find(|level| level.index == index as i32)
            .map(|level| level.label.as_str())
    }

    /// Label for the quality menu. Under Auto it names the level the
    /// engine resolved to, e.g. "Auto (720p)".
    pub fn quality_label(&self) -> String {
        match self.quality_selection {
            QualitySelection::Auto => match self
                .resolved_level
                .and_then(|level| self.level_label(level))
            {
                Some(label) => format!("Auto ({label})"),
                None => "Auto".to_string(),
            },
            QualitySelection::Fixed(index) => self
                .level_label(index)
                .map(str::to_string)
                .unwrap_or_else(|| format!("Level {}", index + 1)),
        }
    }

    pub fn audio_label(&self, id: usize) -> Option<&str> {
        self.audio_tracks
            .iter()
            .find(|track| track.id == id)
            .map(|track| track.label.as_str())
    }

    pub fn is_switching(&self, now: Instant) -> bool {
        self.switch.is_some() || self.settle_until.is_some_and(|until| now < until)
    }
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        self.destroy_engine();
    }
}
