use std::fmt::{self, Display};

/// Errors produced by model constructors and validation routines.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelError {
    InvalidQualityIndex { index: i32, available: usize },
    InvalidEpisodeIndex { index: usize, available: usize },
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidQualityIndex { index, available } => write!(
                f,
                "invalid quality index {index} ({available} levels available)"
            ),
            ModelError::InvalidEpisodeIndex { index, available } => write!(
                f,
                "invalid episode index {index} ({available} episodes available)"
            ),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
