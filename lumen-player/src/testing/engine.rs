use std::sync::Arc;

use lumen_contracts::engine::{
    EngineAudioTrack, EngineFactory, EngineLevel, StreamEngine,
};
use lumen_contracts::error::{ContractError, Result};
use lumen_contracts::events::EngineEvent;
use lumen_model::BufferProfile;
use parking_lot::Mutex;
use url::Url;

/// Commands the controller issued to a [`FakeEngine`]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    AttachMedia,
    LoadSource(Url),
    StartLoad(Option<f64>),
    StopLoad,
    RecoverMediaError,
    SetCurrentLevel(Option<usize>),
    SetAudioTrack(usize),
    SetBufferProfile(BufferProfile),
    Destroy,
}

#[derive(Debug, Default)]
struct EngineInner {
    levels: Vec<EngineLevel>,
    audio_tracks: Vec<EngineAudioTrack>,
    calls: Vec<EngineCall>,
    created_with: Option<BufferProfile>,
}

/// Engine that records every call and never emits events by itself
#[derive(Debug, Clone, Default)]
pub struct FakeEngine {
    inner: Arc<Mutex<EngineInner>>,
}

impl FakeEngine {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count(&self, matches: impl Fn(&EngineCall) -> bool) -> usize {
        self.inner.lock().calls.iter().filter(|call| matches(call)).count()
    }

    pub fn is_destroyed(&self) -> bool {
        self.count(|call| *call == EngineCall::Destroy) > 0
    }

    pub fn created_with(&self) -> Option<BufferProfile> {
        self.inner.lock().created_with
    }

    /// Last profile applied, either at creation or later
    pub fn buffer_profile(&self) -> Option<BufferProfile> {
        let inner = self.inner.lock();
        inner
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                EngineCall::SetBufferProfile(profile) => Some(*profile),
                _ => None,
            })
            .or(inner.created_with)
    }

    /// The manifest event a real engine would emit for its levels
    pub fn manifest_parsed(&self) -> EngineEvent {
        let inner = self.inner.lock();
        EngineEvent::ManifestParsed {
            levels: inner.levels.clone(),
            audio_tracks: inner.audio_tracks.clone(),
        }
    }
}

impl StreamEngine for FakeEngine {
    fn attach_media(&mut self) {
        self.inner.lock().calls.push(EngineCall::AttachMedia);
    }

    fn load_source(&mut self, url: &Url) {
        self.inner.lock().calls.push(EngineCall::LoadSource(url.clone()));
    }

    fn start_load(&mut self, start_position: Option<f64>) {
        self.inner
            .lock()
            .calls
            .push(EngineCall::StartLoad(start_position));
    }

    fn stop_load(&mut self) {
        self.inner.lock().calls.push(EngineCall::StopLoad);
    }

    fn recover_media_error(&mut self) {
        self.inner.lock().calls.push(EngineCall::RecoverMediaError);
    }

    fn set_current_level(&mut self, level: Option<usize>) {
        self.inner.lock().calls.push(EngineCall::SetCurrentLevel(level));
    }

    fn set_audio_track(&mut self, id: usize) {
        self.inner.lock().calls.push(EngineCall::SetAudioTrack(id));
    }

    fn set_buffer_profile(&mut self, profile: BufferProfile) {
        self.inner
            .lock()
            .calls
            .push(EngineCall::SetBufferProfile(profile));
    }

    fn destroy(&mut self) {
        self.inner.lock().calls.push(EngineCall::Destroy);
    }
}

#[derive(Debug, Default)]
struct FactoryInner {
    levels: Vec<EngineLevel>,
    audio_tracks: Vec<EngineAudioTrack>,
    fail: bool,
    created: Vec<FakeEngine>,
}

/// Factory handing out [`FakeEngine`]s preloaded with a fixed manifest
#[derive(Debug, Clone, Default)]
pub struct FakeEngineFactory {
    inner: Arc<Mutex<FactoryInner>>,
}

impl FakeEngineFactory {
    /// One level per height, bitrates rising with height
    pub fn with_levels(heights: &[u32]) -> Self {
        let levels = heights
            .iter()
            .map(|&height| EngineLevel {
                height: Some(height),
                bitrate: Some(u64::from(height) * 4_000),
                name: None,
            })
            .collect();
        let factory = Self::default();
        factory.inner.lock().levels = levels;
        factory
    }

    pub fn with_audio_tracks(self, tracks: &[(&str, &str)]) -> Self {
        self.inner.lock().audio_tracks = tracks
            .iter()
            .enumerate()
            .map(|(id, (name, language))| EngineAudioTrack {
                id,
                name: Some(name.to_string()),
                language: Some(language.to_string()),
            })
            .collect();
        self
    }

    pub fn fail_creation(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    pub fn engines(&self) -> Vec<FakeEngine> {
        self.inner.lock().created.clone()
    }

    /// Most recently created engine
    pub fn latest(&self) -> Option<FakeEngine> {
        self.inner.lock().created.last().cloned()
    }

    pub fn created_count(&self) -> usize {
        self.inner.lock().created.len()
    }
}

impl EngineFactory for FakeEngineFactory {
    fn create(&self, profile: BufferProfile) -> Result<Box<dyn StreamEngine>> {
        let mut inner = self.inner.lock();
        if inner.fail {
            return Err(ContractError::EngineUnavailable(
                "adaptive streaming is not supported".into(),
            ));
        }
        let engine = FakeEngine {
            inner: Arc::new(Mutex::new(EngineInner {
                levels: inner.levels.clone(),
                audio_tracks: inner.audio_tracks.clone(),
                calls: Vec::new(),
                created_with: Some(profile),
            })),
        };
        inner.created.push(engine.clone());
        Ok(Box::new(engine))
    }
}
