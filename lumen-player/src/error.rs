use lumen_contracts::ContractError;
use lumen_model::ModelError;
use thiserror::Error;

/// Requests the controller refused. None of these leave the session in a
/// different state than before the call.
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("no playback session is loaded")]
    NoSession,

    #[error("stream engine is not available")]
    NoEngine,

    #[error("a track switch is still in progress")]
    SwitchInProgress,

    #[error("unknown audio track {0}")]
    UnknownAudioTrack(usize),

    #[error("no subtitle track for language `{0}`")]
    UnknownSubtitle(String),

    #[error("media duration is not known yet")]
    UnknownDuration,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Contract(#[from] ContractError),
}

pub type PlayerResult<T> = Result<T, PlayerError>;
