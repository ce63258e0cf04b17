use std::sync::Arc;

use lumen_contracts::playing_flag::PlayingFlag;
use parking_lot::Mutex;

/// Playing flag that remembers every write instead of touching the global
#[derive(Debug, Clone, Default)]
pub struct RecordingPlayingFlag {
    history: Arc<Mutex<Vec<bool>>>,
}

impl RecordingPlayingFlag {
    pub fn is_set(&self) -> bool {
        self.history.lock().last().copied().unwrap_or(false)
    }

    pub fn history(&self) -> Vec<bool> {
        self.history.lock().clone()
    }
}

impl PlayingFlag for RecordingPlayingFlag {
    fn set_playing(&self, playing: bool) {
        self.history.lock().push(playing);
    }
}
