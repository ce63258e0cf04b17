//! In-memory doubles for the host contracts
//!
//! Every double is a cheap handle over shared state: clone it, move one
//! clone into the controller and keep the other to drive and inspect it.
//!
//! ```rust,no_run
//! use lumen_player::testing::{FakeEngineFactory, FakeMediaElement};
//!
//! let media = FakeMediaElement::new();
//! let engines = FakeEngineFactory::with_levels(&[360, 720, 1080]);
//! let controller = lumen_player::PlaybackController::new(
//!     Default::default(),
//!     Box::new(media.clone()),
//!     std::sync::Arc::new(engines.clone()),
//! );
//! # let _ = controller;
//! ```

mod engine;
mod flag;
mod history;
mod media;

pub use engine::{EngineCall, FakeEngine, FakeEngineFactory};
pub use flag::RecordingPlayingFlag;
pub use history::{HistoryWrite, InMemoryWatchHistory};
pub use media::FakeMediaElement;
