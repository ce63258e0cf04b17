use std::fmt::{self, Display};

use crate::error::{ModelError, Result};

/// One selectable rendition offered by the master playlist.
///
/// The list exposed to the UI always starts with a single Auto pseudo level
/// (`index == AUTO_INDEX`) followed by one entry per concrete level, ordered
/// the way the engine reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityLevel {
    pub index: i32,
    pub label: String,
    pub height: Option<u32>,
    pub bitrate: Option<u64>,
}

impl QualityLevel {
    /// Engine index meaning "let the bandwidth estimator choose"
    pub const AUTO_INDEX: i32 = -1;

    pub fn auto() -> Self {
        Self {
            index: Self::AUTO_INDEX,
            label: "Auto".to_string(),
            height: None,
            bitrate: None,
        }
    }

    /// Build a concrete level, deriving a display label from the rendition
    pub fn concrete(
        index: usize,
        height: Option<u32>,
        bitrate: Option<u64>,
    ) -> Self {
        let label = match (height, bitrate) {
            (Some(h), _) if h > 0 => format!("{h}p"),
            (_, Some(bps)) if bps > 0 => format!("{} kbps", bps / 1000),
            _ => format!("Level {}", index + 1),
        };
        Self {
            index: index as i32,
            label,
            height,
            bitrate,
        }
    }

    pub fn is_auto(&self) -> bool {
        self.index == Self::AUTO_INDEX
    }
}

/// Quality the user (or the startup policy) asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum QualitySelection {
    #[default]
    Auto,
    Fixed(usize),
}

impl QualitySelection {
    /// Validate a selection against the number of concrete levels
    pub fn validated(self, concrete_levels: usize) -> Result<Self> {
        match self {
            QualitySelection::Auto => Ok(self),
            QualitySelection::Fixed(index) if index < concrete_levels => {
                Ok(self)
            }
            QualitySelection::Fixed(index) => {
                Err(ModelError::InvalidQualityIndex {
                    index: index as i32,
                    available: concrete_levels,
                })
            }
        }
    }

    /// Engine representation: `None` hands control to the estimator
    pub fn engine_level(self) -> Option<usize> {
        match self {
            QualitySelection::Auto => None,
            QualitySelection::Fixed(index) => Some(index),
        }
    }

    pub fn from_engine_index(index: i32) -> Self {
        if index < 0 {
            QualitySelection::Auto
        } else {
            QualitySelection::Fixed(index as usize)
        }
    }

    pub fn is_auto(self) -> bool {
        matches!(self, QualitySelection::Auto)
    }
}

impl Display for QualitySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualitySelection::Auto => write!(f, "Auto"),
            QualitySelection::Fixed(index) => write!(f, "Level {index}"),
        }
    }
}
