use std::sync::Arc;

use lumen_contracts::error::{ContractError, Result};
use lumen_contracts::media::{MediaElement, ReadyState, TimeRange};
use lumen_model::TextTrackMode;
use parking_lot::Mutex;

#[derive(Debug)]
struct MediaInner {
    current_time: f64,
    duration: f64,
    paused: bool,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    ready_state: ReadyState,
    buffered: Vec<TimeRange>,
    text_tracks: Vec<(String, TextTrackMode)>,
    reject_play: bool,
    play_calls: usize,
    pause_calls: usize,
    seeks: Vec<f64>,
}

impl Default for MediaInner {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            ready_state: ReadyState::HaveNothing,
            buffered: Vec::new(),
            text_tracks: Vec::new(),
            reject_play: false,
            play_calls: 0,
            pause_calls: 0,
            seeks: Vec::new(),
        }
    }
}

/// Media element with a manually driven clock
#[derive(Debug, Clone, Default)]
pub struct FakeMediaElement {
    inner: Arc<Mutex<MediaInner>>,
}

impl FakeMediaElement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate metadata arriving
    pub fn set_duration(&self, duration: f64) {
        let mut inner = self.inner.lock();
        inner.duration = duration;
        inner.ready_state = inner.ready_state.max(ReadyState::HaveMetadata);
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.inner.lock().ready_state = ready_state;
    }

    /// Move the playhead as playback would, without recording a seek
    pub fn set_position(&self, seconds: f64) {
        self.inner.lock().current_time = seconds;
    }

    pub fn advance(&self, seconds: f64) {
        self.inner.lock().current_time += seconds;
    }

    pub fn position(&self) -> f64 {
        self.inner.lock().current_time
    }

    pub fn is_paused(&self) -> bool {
        self.inner.lock().paused
    }

    /// Host-side pause, e.g. an engine flush that leaves playback paused
    pub fn force_pause(&self) {
        self.inner.lock().paused = true;
    }

    pub fn set_buffered(&self, ranges: Vec<TimeRange>) {
        self.inner.lock().buffered = ranges;
    }

    pub fn reject_play(&self, reject: bool) {
        self.inner.lock().reject_play = reject;
    }

    /// Attach text tracks the way a host renders the declarative list
    pub fn attach_text_tracks(&self, languages: &[&str]) {
        self.inner.lock().text_tracks = languages
            .iter()
            .map(|language| (language.to_string(), TextTrackMode::Disabled))
            .collect();
    }

    pub fn text_track_mode(&self, language: &str) -> Option<TextTrackMode> {
        self.inner
            .lock()
            .text_tracks
            .iter()
            .find(|(lang, _)| lang == language)
            .map(|(_, mode)| *mode)
    }

    pub fn showing_tracks(&self) -> Vec<String> {
        self.inner
            .lock()
            .text_tracks
            .iter()
            .filter(|(_, mode)| *mode == TextTrackMode::Showing)
            .map(|(lang, _)| lang.clone())
            .collect()
    }

    pub fn play_calls(&self) -> usize {
        self.inner.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.inner.lock().pause_calls
    }

    /// Every `set_current_time` issued by the controller, in order
    pub fn seeks(&self) -> Vec<f64> {
        self.inner.lock().seeks.clone()
    }

    pub fn volume_state(&self) -> (f64, bool) {
        let inner = self.inner.lock();
        (inner.volume, inner.muted)
    }

    pub fn playback_rate(&self) -> f64 {
        self.inner.lock().playback_rate
    }
}

impl MediaElement for FakeMediaElement {
    fn current_time(&self) -> f64 {
        self.inner.lock().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut inner = self.inner.lock();
        inner.current_time = seconds;
        inner.seeks.push(seconds);
    }

    fn duration(&self) -> f64 {
        self.inner.lock().duration
    }

    fn paused(&self) -> bool {
        self.inner.lock().paused
    }

    fn play(&mut self) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.play_calls += 1;
        if inner.reject_play {
            return Err(ContractError::PlayRejected(
                "play() requires a user gesture".into(),
            ));
        }
        inner.paused = false;
        Ok(())
    }

    fn pause(&mut self) {
        let mut inner = self.inner.lock();
        inner.pause_calls += 1;
        inner.paused = true;
    }

    fn volume(&self) -> f64 {
        self.inner.lock().volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.inner.lock().volume = volume;
    }

    fn muted(&self) -> bool {
        self.inner.lock().muted
    }

    fn set_muted(&mut self, muted: bool) {
        self.inner.lock().muted = muted;
    }

    fn set_playback_rate(&mut self, rate: f64) {
        self.inner.lock().playback_rate = rate;
    }

    fn ready_state(&self) -> ReadyState {
        self.inner.lock().ready_state
    }

    fn buffered(&self) -> Vec<TimeRange> {
        self.inner.lock().buffered.clone()
    }

    fn text_track_languages(&self) -> Vec<String> {
        self.inner
            .lock()
            .text_tracks
            .iter()
            .map(|(lang, _)| lang.clone())
            .collect()
    }

    fn set_text_track_mode(&mut self, index: usize, mode: TextTrackMode) {
        if let Some((_, current)) = self.inner.lock().text_tracks.get_mut(index) {
            *current = mode;
        }
    }
}
