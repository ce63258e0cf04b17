use thiserror::Error;

use crate::models::player::PlayerConfig;

/// Values that would make the controller misbehave
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("completion threshold must be within (0, 1], got {0}")]
    CompletionThreshold(f64),

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("{field} must be a finite, non-negative number, got {value}")]
    NegativeValue { field: &'static str, value: f64 },

    #[error("relaxed buffer windows must not be smaller than the startup windows")]
    RelaxedBufferTooSmall,

    #[error("previous-episode restart ratio must be within [0, 1), got {0}")]
    RestartRatio(f64),
}

fn non_negative(
    field: &'static str,
    value: f64,
) -> Result<(), ConfigValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::NegativeValue { field, value })
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigValidationError> {
    if value == 0 {
        Err(ConfigValidationError::ZeroDuration { field })
    } else {
        Ok(())
    }
}

impl PlayerConfig {
    /// Reject combinations the controller cannot honour
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let threshold = self.watch_sync.completion_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigValidationError::CompletionThreshold(threshold));
        }

        non_zero("watch_sync.debounce_ms", self.watch_sync.debounce_ms)?;
        non_zero(
            "buffering.spinner_debounce_ms",
            self.buffering.spinner_debounce_ms,
        )?;
        non_zero(
            "buffering.watchdog_interval_ms",
            self.buffering.watchdog_interval_ms,
        )?;
        non_zero(
            "switching.completion_timeout_ms",
            self.switching.completion_timeout_ms,
        )?;

        non_negative(
            "watch_sync.min_delta_seconds",
            self.watch_sync.min_delta_seconds,
        )?;
        non_negative(
            "buffering.stall_nudge_seconds",
            self.buffering.stall_nudge_seconds,
        )?;
        non_negative("seek.short_step_seconds", self.seek.short_step_seconds)?;
        non_negative("seek.long_step_seconds", self.seek.long_step_seconds)?;

        if !self.buffering.relaxed.covers(&self.buffering.startup) {
            return Err(ConfigValidationError::RelaxedBufferTooSmall);
        }

        let ratio = self.controls.previous_restart_ratio;
        if !(0.0..1.0).contains(&ratio) {
            return Err(ConfigValidationError::RestartRatio(ratio));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PlayerConfig::default().validate(), Ok(()));
    }

    #[test]
    fn threshold_outside_unit_interval_is_rejected() {
        let mut config = PlayerConfig::default();
        config.watch_sync.completion_threshold = 1.2;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::CompletionThreshold(1.2))
        );

        config.watch_sync.completion_threshold = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn shrinking_relaxed_buffer_is_rejected() {
        let mut config = PlayerConfig::default();
        config.buffering.relaxed.max_buffer_length = 1.0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::RelaxedBufferTooSmall)
        );
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let mut config = PlayerConfig::default();
        config.watch_sync.debounce_ms = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigValidationError::ZeroDuration {
                field: "watch_sync.debounce_ms"
            })
        );
    }
}
