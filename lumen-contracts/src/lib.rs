//! Trait surfaces the playback controller drives and is driven by.
//!
//! Hosts implement [`media::MediaElement`], [`engine::StreamEngine`] and
//! [`history::WatchHistory`] for their platform; the controller never talks
//! to a concrete player or network client directly.

pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod media;
pub mod playing_flag;

pub use error::ContractError;
