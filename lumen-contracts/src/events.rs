//! Engine event boundary
//!
//! Engine bindings forward the library's events verbatim as
//! [`RawEngineEvent`]s. [`EngineEvent::from_raw`] is the only place that
//! knows their names and payload shapes; everything past it works on the
//! narrow [`EngineEvent`] union.

use log::trace;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::engine::{EngineAudioTrack, EngineLevel};
use crate::error::{ContractError, Result};

pub const MANIFEST_PARSED: &str = "hlsManifestParsed";
pub const LEVEL_SWITCHED: &str = "hlsLevelSwitched";
pub const LEVEL_LOADING: &str = "hlsLevelLoading";
pub const AUDIO_TRACKS_UPDATED: &str = "hlsAudioTracksUpdated";
pub const AUDIO_TRACK_SWITCHED: &str = "hlsAudioTrackSwitched";
pub const BUFFER_APPENDED: &str = "hlsBufferAppended";
pub const BUFFER_FLUSHED: &str = "hlsBufferFlushed";
pub const ERROR: &str = "hlsError";

/// Event exactly as emitted by the engine library
#[derive(Debug, Clone, PartialEq)]
pub struct RawEngineEvent {
    pub name: String,
    pub data: Value,
}

impl RawEngineEvent {
    pub fn new(name: impl Into<String>, data: Value) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineErrorKind {
    Network,
    Media,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub fatal: bool,
    pub details: String,
}

/// Engine notifications the controller reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    ManifestParsed {
        levels: Vec<EngineLevel>,
        audio_tracks: Vec<EngineAudioTrack>,
    },
    LevelSwitched {
        level: usize,
    },
    LevelLoading {
        level: usize,
    },
    AudioTracksUpdated {
        tracks: Vec<EngineAudioTrack>,
    },
    AudioTrackSwitched {
        id: usize,
    },
    BufferAppended,
    BufferFlushed,
    Error(EngineError),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestPayload {
    #[serde(default)]
    levels: Vec<EngineLevel>,
    #[serde(default)]
    audio_tracks: Vec<EngineAudioTrack>,
}

#[derive(Deserialize)]
struct LevelPayload {
    level: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AudioTracksPayload {
    #[serde(default)]
    audio_tracks: Vec<EngineAudioTrack>,
}

#[derive(Deserialize)]
struct AudioTrackPayload {
    id: usize,
}

#[derive(Deserialize)]
struct ErrorPayload {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    details: String,
    #[serde(default)]
    fatal: bool,
}

fn payload<T: DeserializeOwned>(raw: &RawEngineEvent) -> Result<T> {
    T::deserialize(&raw.data).map_err(|source| ContractError::MalformedEvent {
        name: raw.name.clone(),
        source,
    })
}

impl EngineEvent {
    /// Adapt a raw library event. Events the controller has no use for
    /// yield `Ok(None)`.
    pub fn from_raw(raw: &RawEngineEvent) -> Result<Option<Self>> {
        let event = match raw.name.as_str() {
            MANIFEST_PARSED => {
                let ManifestPayload {
                    levels,
                    audio_tracks,
                } = payload(raw)?;
                EngineEvent::ManifestParsed {
                    levels,
                    audio_tracks,
                }
            }
            LEVEL_SWITCHED => {
                let LevelPayload { level } = payload(raw)?;
                EngineEvent::LevelSwitched { level }
            }
            LEVEL_LOADING => {
                let LevelPayload { level } = payload(raw)?;
                EngineEvent::LevelLoading { level }
            }
            AUDIO_TRACKS_UPDATED => {
                let AudioTracksPayload { audio_tracks } = payload(raw)?;
                EngineEvent::AudioTracksUpdated {
                    tracks: audio_tracks,
                }
            }
            AUDIO_TRACK_SWITCHED => {
                let AudioTrackPayload { id } = payload(raw)?;
                EngineEvent::AudioTrackSwitched { id }
            }
            BUFFER_APPENDED => EngineEvent::BufferAppended,
            BUFFER_FLUSHED => EngineEvent::BufferFlushed,
            ERROR => {
                let ErrorPayload {
                    kind,
                    details,
                    fatal,
                } = payload(raw)?;
                let kind = match kind.as_str() {
                    "networkError" => EngineErrorKind::Network,
                    "mediaError" => EngineErrorKind::Media,
                    _ => EngineErrorKind::Other,
                };
                EngineEvent::Error(EngineError {
                    kind,
                    fatal,
                    details,
                })
            }
            other => {
                trace!("Ignoring engine event {}", other);
                return Ok(None);
            }
        };
        Ok(Some(event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn manifest_parsed_carries_levels_and_tracks() {
        let raw = RawEngineEvent::new(
            MANIFEST_PARSED,
            json!({
                "levels": [
                    { "height": 360, "bitrate": 800000 },
                    { "height": 720, "bitrate": 2800000, "name": "HD" }
                ],
                "audioTracks": [{ "id": 0, "name": "English", "lang": "en" }]
            }),
        );
        let Some(EngineEvent::ManifestParsed {
            levels,
            audio_tracks,
        }) = EngineEvent::from_raw(&raw).unwrap()
        else {
            panic!("expected manifest event");
        };
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[1].name.as_deref(), Some("HD"));
        assert_eq!(audio_tracks[0].language.as_deref(), Some("en"));
    }

    #[test]
    fn error_kinds_are_classified() {
        let raw = RawEngineEvent::new(
            ERROR,
            json!({ "type": "mediaError", "details": "bufferStalledError", "fatal": true }),
        );
        let event = EngineEvent::from_raw(&raw).unwrap();
        assert_eq!(
            event,
            Some(EngineEvent::Error(EngineError {
                kind: EngineErrorKind::Media,
                fatal: true,
                details: "bufferStalledError".into(),
            }))
        );

        let raw = RawEngineEvent::new(ERROR, json!({ "type": "keySystemError" }));
        let Some(EngineEvent::Error(err)) = EngineEvent::from_raw(&raw).unwrap()
        else {
            panic!("expected error event");
        };
        assert_eq!(err.kind, EngineErrorKind::Other);
        assert!(!err.fatal);
    }

    #[test]
    fn unknown_events_are_ignored() {
        let raw = RawEngineEvent::new("hlsFragLoaded", json!({}));
        assert!(EngineEvent::from_raw(&raw).unwrap().is_none());
    }

    #[test]
    fn malformed_payload_is_reported() {
        let raw = RawEngineEvent::new(LEVEL_SWITCHED, json!({ "level": "high" }));
        assert!(matches!(
            EngineEvent::from_raw(&raw),
            Err(ContractError::MalformedEvent { .. })
        ));
    }
}
