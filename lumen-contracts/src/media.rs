use std::fmt;

use lumen_model::TextTrackMode;

use crate::error::Result;

/// How much media data the element holds around the playhead.
///
/// Ordered so that `state >= ReadyState::HaveMetadata` reads naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Half-open buffered interval in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: f64,
    pub end: f64,
}

impl TimeRange {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, position: f64) -> bool {
        position >= self.start && position < self.end
    }
}

/// The media element a session owns exclusively.
///
/// Mirrors the subset of an HTML media element the controller needs.
/// `duration` returns `NaN` until metadata is known.
pub trait MediaElement: Send + fmt::Debug {
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, seconds: f64);

    fn duration(&self) -> f64;

    fn paused(&self) -> bool;

    /// Start playback. An `Err(ContractError::PlayRejected)` means the
    /// platform wants a user gesture first.
    ///
    /// [`ContractError::PlayRejected`]: crate::ContractError::PlayRejected
    fn play(&mut self) -> Result<()>;

    fn pause(&mut self);

    fn volume(&self) -> f64;

    fn set_volume(&mut self, volume: f64);

    fn muted(&self) -> bool;

    fn set_muted(&mut self, muted: bool);

    fn set_playback_rate(&mut self, rate: f64);

    fn ready_state(&self) -> ReadyState;

    fn buffered(&self) -> Vec<TimeRange>;

    /// Languages of the text tracks currently attached, in element order
    fn text_track_languages(&self) -> Vec<String>;

    /// `index` refers to the order of [`MediaElement::text_track_languages`]
    fn set_text_track_mode(&mut self, index: usize, mode: TextTrackMode);

    /// True when `position` falls inside any buffered range
    fn is_buffered(&self, position: f64) -> bool {
        self.buffered().iter().any(|range| range.contains(position))
    }
}
