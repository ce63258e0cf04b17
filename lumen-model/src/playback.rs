use std::fmt::{self, Display};

/// Why a session ended up in the terminal error state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ErrorReason {
    /// Manifest or segments could not be fetched, even after a reload
    Network { details: String },
    /// The decoder rejected the stream, even after media recovery
    Media { details: String },
    /// Anything the engine cannot recover from on its own
    Fatal { details: String },
    /// The media element itself reported an error
    Element { details: String },
}

impl ErrorReason {
    pub fn details(&self) -> &str {
        match self {
            ErrorReason::Network { details }
            | ErrorReason::Media { details }
            | ErrorReason::Fatal { details }
            | ErrorReason::Element { details } => details,
        }
    }
}

impl Display for ErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorReason::Network { details } => {
                write!(f, "network error: {details}")
            }
            ErrorReason::Media { details } => {
                write!(f, "media error: {details}")
            }
            ErrorReason::Fatal { details } => write!(f, "fatal error: {details}"),
            ErrorReason::Element { details } => {
                write!(f, "media element error: {details}")
            }
        }
    }
}

/// One-shot recovery currently being attempted after a fatal engine error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RecoveryKind {
    NetworkReload,
    MediaRecovery,
}

/// Coarse player state derived from media element and engine events
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "state", rename_all = "snake_case"))]
pub enum PlaybackState {
    #[default]
    Idle,
    Loading,
    Buffering,
    Playing,
    Paused,
    Stalled,
    Ended,
    /// Fatal error seen, one recovery attempt in flight
    Recovering { kind: RecoveryKind },
    Error { reason: ErrorReason },
}

impl PlaybackState {
    pub fn is_error(&self) -> bool {
        matches!(self, PlaybackState::Error { .. })
    }

    /// Playback is expected to be advancing (possibly waiting on data)
    pub fn is_nominally_playing(&self) -> bool {
        matches!(
            self,
            PlaybackState::Playing
                | PlaybackState::Buffering
                | PlaybackState::Stalled
        )
    }

    pub fn is_waiting_for_data(&self) -> bool {
        matches!(self, PlaybackState::Buffering | PlaybackState::Stalled)
    }
}

impl Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackState::Idle => write!(f, "Idle"),
            PlaybackState::Loading => write!(f, "Loading"),
            PlaybackState::Buffering => write!(f, "Buffering"),
            PlaybackState::Playing => write!(f, "Playing"),
            PlaybackState::Paused => write!(f, "Paused"),
            PlaybackState::Stalled => write!(f, "Stalled"),
            PlaybackState::Ended => write!(f, "Ended"),
            PlaybackState::Recovering { kind } => {
                write!(f, "Recovering({kind:?})")
            }
            PlaybackState::Error { reason } => write!(f, "Error({reason})"),
        }
    }
}

/// Progress bar interaction state.
///
/// While dragging, the displayed progress is `preview_time` and diverges from
/// the media element's real position until the drag is committed.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScrubState {
    #[default]
    Idle,
    Dragging { preview_time: f64, was_playing: bool },
}

impl ScrubState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, ScrubState::Dragging { .. })
    }

    pub fn preview_time(&self) -> Option<f64> {
        match self {
            ScrubState::Idle => None,
            ScrubState::Dragging { preview_time, .. } => Some(*preview_time),
        }
    }
}
