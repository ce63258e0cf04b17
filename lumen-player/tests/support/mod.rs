#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use lumen_config::PlayerConfig;
use lumen_model::{ContentId, ProfileId, WatchTarget};
use lumen_player::testing::{
    FakeEngine, FakeEngineFactory, FakeMediaElement, InMemoryWatchHistory,
    RecordingPlayingFlag,
};
use lumen_player::{
    MediaEvent, PlaybackController, PlaybackSource, PlayerMessage,
    PlayerUpdateResult,
};
use url::Url;

pub const MASTER_URL: &str = "https://cdn.example/library/42/master.m3u8";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A controller wired to in-memory doubles, with handles kept for
/// inspection
pub struct Harness {
    pub controller: PlaybackController,
    pub media: FakeMediaElement,
    pub engines: FakeEngineFactory,
    pub history: InMemoryWatchHistory,
    pub flag: RecordingPlayingFlag,
    pub target: WatchTarget,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_engines(
            FakeEngineFactory::with_levels(&[360, 720, 1080])
                .with_audio_tracks(&[("English", "en"), ("Deutsch", "de")]),
        )
    }

    pub fn with_engines(engines: FakeEngineFactory) -> Self {
        Self::with_config(PlayerConfig::default(), engines)
    }

    pub fn with_config(config: PlayerConfig, engines: FakeEngineFactory) -> Self {
        init_logging();
        let media = FakeMediaElement::new();
        let history = InMemoryWatchHistory::new();
        let flag = RecordingPlayingFlag::default();
        let controller = PlaybackController::new(
            config,
            Box::new(media.clone()),
            Arc::new(engines.clone()),
        )
        .with_watch_history(Arc::new(history.clone()))
        .with_playing_flag(Arc::new(flag.clone()));

        Self {
            controller,
            media,
            engines,
            history,
            flag,
            target: WatchTarget::new(ProfileId::new(), ContentId::new()),
        }
    }

    pub fn source(&self) -> PlaybackSource {
        let url = Url::parse(MASTER_URL).unwrap();
        PlaybackSource::new(url.clone())
            .with_subtitle("en", url.join("subs/en.vtt").unwrap())
            .with_subtitle("fr", url.join("subs/fr.vtt").unwrap())
            .with_watch_target(self.target)
    }

    pub async fn load(&mut self) {
        let source = self.source();
        self.controller.load(source).await.unwrap();
    }

    pub fn engine(&self) -> FakeEngine {
        self.engines.latest().expect("an engine was created")
    }

    pub fn send(&mut self, message: PlayerMessage) -> PlayerUpdateResult {
        self.controller.update(message)
    }

    pub fn media_event(&mut self, event: MediaEvent) -> PlayerUpdateResult {
        self.send(PlayerMessage::Media(event))
    }

    pub fn manifest(&mut self) -> PlayerUpdateResult {
        let manifest = self.engine().manifest_parsed();
        self.send(PlayerMessage::Engine(manifest))
    }

    /// Manifest, text tracks, metadata and the first frame
    pub fn start_playback(&mut self, duration: f64) {
        self.manifest();
        self.media.attach_text_tracks(&["en", "fr"]);
        self.media.set_duration(duration);
        self.media_event(MediaEvent::LoadedMetadata);
        self.media_event(MediaEvent::Playing);
    }

    /// Let virtual time pass, then deliver a heartbeat
    pub async fn advance(&mut self, millis: u64) -> PlayerUpdateResult {
        tokio::time::advance(Duration::from_millis(millis)).await;
        self.send(PlayerMessage::Tick)
    }

    /// Let spawned history writes run to completion
    pub async fn settle_writes(&mut self) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        self.controller.drain_watch_writes().await;
    }
}
