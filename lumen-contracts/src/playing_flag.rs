//! Process-wide "video is playing" flag
//!
//! Navigation chrome reads the flag to hide itself while a session is
//! mounted. The player only ever writes it, through [`PlayingFlagGuard`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

static VIDEO_PLAYING: AtomicBool = AtomicBool::new(false);

/// Write-only sink for the playing flag
pub trait PlayingFlag: Send + Sync + fmt::Debug {
    fn set_playing(&self, playing: bool);
}

/// Default sink backed by a static atomic
#[derive(Debug, Default, Clone, Copy)]
pub struct GlobalPlayingFlag;

impl PlayingFlag for GlobalPlayingFlag {
    fn set_playing(&self, playing: bool) {
        VIDEO_PLAYING.store(playing, Ordering::Release);
    }
}

/// Read the flag set by [`GlobalPlayingFlag`]
pub fn is_video_playing() -> bool {
    VIDEO_PLAYING.load(Ordering::Acquire)
}

/// Sets the flag on creation and clears it when dropped
#[derive(Debug)]
pub struct PlayingFlagGuard {
    flag: Arc<dyn PlayingFlag>,
}

impl PlayingFlagGuard {
    pub fn new(flag: Arc<dyn PlayingFlag>) -> Self {
        flag.set_playing(true);
        Self { flag }
    }
}

impl Drop for PlayingFlagGuard {
    fn drop(&mut self) {
        self.flag.set_playing(false);
    }
}
