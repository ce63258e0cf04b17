use crate::error::{ModelError, Result};
use crate::ids::ContentId;

/// Display information for one entry of an episode sequence
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeInfo {
    pub content_id: Option<ContentId>,
    pub title: String,
    pub season_number: Option<u16>,
    pub episode_number: Option<u16>,
}

impl EpisodeInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            content_id: None,
            title: title.into(),
            season_number: None,
            episode_number: None,
        }
    }

    /// "S01E02 - Title" when numbering is known, else the bare title
    pub fn display_title(&self) -> String {
        match (self.season_number, self.episode_number) {
            (Some(season), Some(episode)) => {
                format!("S{season:02}E{episode:02} - {}", self.title)
            }
            _ => self.title.clone(),
        }
    }
}

/// Sequencing context handed to the player for series playback
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeContext {
    pub episodes: Vec<EpisodeInfo>,
    pub current_index: usize,
}

impl EpisodeContext {
    pub fn new(episodes: Vec<EpisodeInfo>, current_index: usize) -> Result<Self> {
        if current_index >= episodes.len() {
            return Err(ModelError::InvalidEpisodeIndex {
                index: current_index,
                available: episodes.len(),
            });
        }
        Ok(Self {
            episodes,
            current_index,
        })
    }

    pub fn current(&self) -> Option<&EpisodeInfo> {
        self.episodes.get(self.current_index)
    }

    pub fn next_index(&self) -> Option<usize> {
        let next = self.current_index + 1;
        (next < self.episodes.len()).then_some(next)
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.current_index.checked_sub(1)
    }
}
