//! Configuration for the Lumen playback controller.
//!
//! Every timing and threshold the controller uses lives in [`PlayerConfig`].
//! Hosts either construct it directly or call
//! [`PlayerConfig::load_from_env`], which layers an env-provided file or
//! inline JSON over the built-in defaults.

pub mod models;
pub mod validation;

pub use models::player::{PlayerConfig, PlayerConfigSource};
pub use models::sections::{
    BufferingConfig, ControlsConfig, SeekConfig, StartupConfig, SwitchConfig,
    WatchSyncConfig,
};
pub use validation::ConfigValidationError;
