//! Core data model definitions shared across Lumen crates.
#![allow(missing_docs)]

pub mod buffer;
pub mod episodes;
pub mod error;
pub mod ids;
pub mod playback;
pub mod prelude;
pub mod quality;
pub mod tracks;
pub mod watch;

// Intentionally curated re-exports for downstream consumers.
pub use buffer::BufferProfile;
pub use episodes::{EpisodeContext, EpisodeInfo};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{ContentId, ProfileId};
pub use playback::{ErrorReason, PlaybackState, RecoveryKind, ScrubState};
pub use quality::{QualityLevel, QualitySelection};
pub use tracks::{
    AudioTrack, SubtitleSelection, SubtitleTrack, TextTrackMode,
    subtitle_language_label,
};
pub use watch::{WatchProgress, WatchProgressRecord, WatchTarget};
