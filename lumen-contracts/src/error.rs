use thiserror::Error;

/// Failures reported across the host contract boundary
#[derive(Debug, Error)]
pub enum ContractError {
    /// The element refused to start playback (autoplay policy)
    #[error("playback start rejected: {0}")]
    PlayRejected(String),

    #[error("stream engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("watch history request failed: {0}")]
    History(String),

    #[error("malformed `{name}` engine event: {source}")]
    MalformedEvent {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, ContractError>;
