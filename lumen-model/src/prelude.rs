//! Frequently used model types for player and host crates.

pub use crate::buffer::BufferProfile;
pub use crate::episodes::{EpisodeContext, EpisodeInfo};
pub use crate::ids::{ContentId, ProfileId};
pub use crate::playback::{
    ErrorReason, PlaybackState, RecoveryKind, ScrubState,
};
pub use crate::quality::{QualityLevel, QualitySelection};
pub use crate::tracks::{
    AudioTrack, SubtitleSelection, SubtitleTrack, TextTrackMode,
};
pub use crate::watch::{WatchProgress, WatchProgressRecord, WatchTarget};
