use std::fmt;

use lumen_model::BufferProfile;
use serde::Deserialize;
use url::Url;

use crate::error::Result;

/// One rendition advertised by the master playlist
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct EngineLevel {
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bitrate: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Alternate audio rendition as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineAudioTrack {
    pub id: usize,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "lang")]
    pub language: Option<String>,
}

/// Adaptive streaming engine bound 1:1 to the session's media element.
///
/// Engines are never reused across sources: a source change destroys the
/// current engine and asks the [`EngineFactory`] for a new one.
pub trait StreamEngine: Send + fmt::Debug {
    /// Bind to the media element the session owns
    fn attach_media(&mut self);

    fn load_source(&mut self, url: &Url);

    /// (Re)start segment loading, optionally from `start_position` seconds
    fn start_load(&mut self, start_position: Option<f64>);

    fn stop_load(&mut self);

    fn recover_media_error(&mut self);

    /// Pin a level, or hand selection back to the engine with `None`
    fn set_current_level(&mut self, level: Option<usize>);

    fn set_audio_track(&mut self, id: usize);

    fn set_buffer_profile(&mut self, profile: BufferProfile);

    /// Release decoder and network resources. Safe to call more than once.
    fn destroy(&mut self);
}

/// Builds fresh engines for each session
pub trait EngineFactory: Send + Sync + fmt::Debug {
    fn create(&self, profile: BufferProfile) -> Result<Box<dyn StreamEngine>>;
}
