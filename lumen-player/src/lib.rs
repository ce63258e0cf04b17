//! Lumen playback controller
//!
//! A headless controller that drives one media element through one adaptive
//! streaming engine. Hosts feed it media element events, engine events and
//! user input as [`player::messages::PlayerMessage`]s and render from its
//! state; everything platform specific sits behind the traits in
//! `lumen-contracts`.
//!
//! Notes
//! - Timers are deadlines checked on [`player::messages::PlayerMessage::Tick`],
//!   so the host decides the cadence.
//! - Only watch-history calls are async; they run as tokio tasks.

pub mod error;
pub mod player;
pub mod testing;

pub use error::{PlayerError, PlayerResult};
pub use player::messages::{MediaEvent, PlayerMessage, TrackGeometry};
pub use player::{
    PlaybackController, PlaybackSource, PlayerEvent, PlayerUpdateResult,
};
