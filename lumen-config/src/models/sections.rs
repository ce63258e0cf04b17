use lumen_model::BufferProfile;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// First-frame policy: how quickly the session hands quality selection back
/// to the engine and whether it tries to autoplay.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Delay (ms) after playback demonstrably starts before the pinned
    /// lowest level is released to Auto. Ignored once the user picks a
    /// quality themselves.
    pub auto_quality_grace_ms: u64,
    /// Call `play()` as soon as metadata is available.
    pub autoplay: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            auto_quality_grace_ms: 1_000,
            autoplay: true,
        }
    }
}

impl StartupConfig {
    pub fn auto_quality_grace(&self) -> Duration {
        Duration::from_millis(self.auto_quality_grace_ms)
    }
}

/// Buffer windows plus the stall detection knobs.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct BufferingConfig {
    /// Windows used from engine construction until playback is established.
    pub startup: BufferProfile,
    /// Windows applied once playback has been healthy for `widen_delay_ms`.
    pub relaxed: BufferProfile,
    pub widen_delay_ms: u64,
    /// How long a stall must persist after first playback before the
    /// loading indicator is shown. Stalls before first frame never show it.
    pub spinner_debounce_ms: u64,
    /// Watchdog period; a position unchanged across one period while
    /// nominally playing counts as stuck.
    pub watchdog_interval_ms: u64,
    /// Seconds the watchdog nudges a stuck playhead forward.
    pub stall_nudge_seconds: f64,
}

impl Default for BufferingConfig {
    fn default() -> Self {
        Self {
            startup: BufferProfile::startup(),
            relaxed: BufferProfile::relaxed(),
            widen_delay_ms: 2_000,
            spinner_debounce_ms: 150,
            watchdog_interval_ms: 1_000,
            stall_nudge_seconds: 0.1,
        }
    }
}

impl BufferingConfig {
    pub fn widen_delay(&self) -> Duration {
        Duration::from_millis(self.widen_delay_ms)
    }

    pub fn spinner_debounce(&self) -> Duration {
        Duration::from_millis(self.spinner_debounce_ms)
    }

    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_millis(self.watchdog_interval_ms)
    }
}

/// Serialization of quality and audio switches.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Quiet period after a switch completes before another is accepted.
    pub settle_delay_ms: u64,
    /// Upper bound on waiting for the engine's switch notification.
    pub completion_timeout_ms: u64,
}

impl Default for SwitchConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 300,
            completion_timeout_ms: 5_000,
        }
    }
}

impl SwitchConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SeekConfig {
    /// Minimum spacing of scrub preview updates (16 ms is roughly 60 Hz).
    pub scrub_throttle_ms: u64,
    pub short_step_seconds: f64,
    pub long_step_seconds: f64,
}

impl Default for SeekConfig {
    fn default() -> Self {
        Self {
            scrub_throttle_ms: 16,
            short_step_seconds: 5.0,
            long_step_seconds: 10.0,
        }
    }
}

impl SeekConfig {
    pub fn scrub_throttle(&self) -> Duration {
        Duration::from_millis(self.scrub_throttle_ms)
    }
}

/// Watch-history write policy.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WatchSyncConfig {
    /// Quiet window before a pending position is written.
    pub debounce_ms: u64,
    /// Positions closer than this to the last written one are skipped,
    /// except for completion.
    pub min_delta_seconds: f64,
    /// Fraction of duration at which content counts as completed.
    pub completion_threshold: f64,
}

impl Default for WatchSyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 5_000,
            min_delta_seconds: 5.0,
            completion_threshold: 0.95,
        }
    }
}

impl WatchSyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub auto_hide_ms: u64,
    pub notification_ms: u64,
    /// "Previous" restarts the current episode once this fraction has been
    /// watched.
    pub previous_restart_ratio: f64,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: 3_000,
            notification_ms: 2_000,
            previous_restart_ratio: 0.05,
        }
    }
}

impl ControlsConfig {
    pub fn auto_hide(&self) -> Duration {
        Duration::from_millis(self.auto_hide_ms)
    }

    pub fn notification(&self) -> Duration {
        Duration::from_millis(self.notification_ms)
    }
}
