//! Watch position records and progress helpers
//!
//! The external store is authoritative for [`WatchProgressRecord`]s. The
//! player only reads one when a session starts and writes updates while
//! playback advances.

use chrono::{DateTime, Utc};

use crate::ids::{ContentId, ProfileId};

/// The (profile, content) pair a watch position is tracked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatchTarget {
    pub profile_id: ProfileId,
    pub content_id: ContentId,
}

impl WatchTarget {
    pub fn new(profile_id: ProfileId, content_id: ContentId) -> Self {
        Self {
            profile_id,
            content_id,
        }
    }
}

/// Persisted resume point for one profile and one content item
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WatchProgressRecord {
    pub profile_id: ProfileId,
    pub content_id: ContentId,
    /// Resume position in seconds; reset to zero once completed
    pub watch_time_seconds: f64,
    pub completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

impl WatchProgressRecord {
    pub fn new(target: WatchTarget, watch_time_seconds: f64, completed: bool) -> Self {
        Self {
            profile_id: target.profile_id,
            content_id: target.content_id,
            watch_time_seconds,
            completed,
            last_watched_at: Utc::now(),
        }
    }

    pub fn target(&self) -> WatchTarget {
        WatchTarget::new(self.profile_id, self.content_id)
    }
}

/// Watch progress ratio, clamped to `0.0..=1.0`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WatchProgress(f64);

impl WatchProgress {
    /// Ratio of position to duration; unknown durations count as unstarted
    pub fn new(position: f64, duration: f64) -> Self {
        if !duration.is_finite() || duration <= 0.0 || !position.is_finite()
        {
            return WatchProgress(0.0);
        }
        WatchProgress((position / duration).clamp(0.0, 1.0))
    }

    pub fn as_ratio(&self) -> f64 {
        self.0
    }

    /// Completion uses a single threshold for the whole session
    pub fn is_completed(&self, threshold: f64) -> bool {
        self.0 >= threshold
    }

    pub fn is_started(&self) -> bool {
        self.0 > 0.0
    }
}
