use lumen_contracts::events::{EngineEvent, RawEngineEvent};
use lumen_model::{QualitySelection, SubtitleSelection};

/// Media element events forwarded by the host
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata,
    CanPlay,
    Play,
    Playing,
    Pause,
    Waiting,
    Stalled,
    TimeUpdate,
    Seeked,
    Ended,
    Error(String),
    /// Text tracks were attached or removed
    TextTracksChanged,
    /// Asynchronous rejection of a `play()` call
    PlayRejected(String),
}

/// Horizontal extent of the progress bar in the host's coordinate space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackGeometry {
    pub left: f64,
    pub width: f64,
}

impl TrackGeometry {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }

    /// Pointer position as a fraction of the track, clamped to `0.0..=1.0`
    /// even when the pointer has left the element
    pub fn fraction(&self, pointer_x: f64) -> f64 {
        if !(self.width > 0.0) || !pointer_x.is_finite() {
            return 0.0;
        }
        ((pointer_x - self.left) / self.width).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerMessage {
    // Inputs from the platform
    Media(MediaEvent),
    Engine(EngineEvent),
    RawEngine(RawEngineEvent),
    /// Periodic heartbeat; all deadlines are evaluated here
    Tick,

    // Playback control
    Play,
    Pause,
    PlayPause,
    /// Click/keypress anywhere; retries a rejected autoplay
    UserGesture,
    /// Click-to-play after a terminal error
    Retry,
    Close,

    // Seeking
    SeekTo(f64),
    SeekRelative(f64),
    SeekForward,
    SeekBackward,
    SeekForwardLong,
    SeekBackwardLong,
    ScrubStart { pointer_x: f64, track: TrackGeometry },
    ScrubMove { pointer_x: f64 },
    ScrubEnd { pointer_x: Option<f64> },
    SeekBarClicked { pointer_x: f64, track: TrackGeometry },

    // Volume and speed
    SetVolume(f64),
    ToggleMute,
    SetPlaybackSpeed(f64),

    // Track selection
    SetQuality(QualitySelection),
    SetAudioTrack(usize),
    SetSubtitleTrack(SubtitleSelection),
    CycleAudioTrack,
    CycleSubtitleTrack,
    ToggleSubtitles,

    // Episodes
    NextEpisode,
    PreviousEpisode,

    // UI
    ShowControls,
    MouseMoved,
}
