//! Side-loaded subtitle tracks
//!
//! The host renders [`SubtitleManager::track_list`] as text tracks on the
//! media element and reports changes with `MediaEvent::TextTracksChanged`.
//! Track modes do not survive metadata loads or engine switches, so
//! [`SubtitleManager::refresh`] re-asserts every mode explicitly.

use std::collections::BTreeMap;

use log::debug;
use lumen_contracts::media::MediaElement;
use lumen_model::{SubtitleSelection, SubtitleTrack, TextTrackMode};
use url::Url;

use crate::error::{PlayerError, PlayerResult};

#[derive(Debug, Default, Clone)]
pub struct SubtitleManager {
    tracks: Vec<SubtitleTrack>,
    selection: SubtitleSelection,
    /// Language restored by `toggle`
    last_language: Option<String>,
}

impl SubtitleManager {
    pub fn initialize(&mut self, subtitle_urls: &BTreeMap<String, Url>) {
        self.tracks = subtitle_urls
            .iter()
            .map(|(language, url)| SubtitleTrack::new(language.clone(), url.clone()))
            .collect();
        self.selection = SubtitleSelection::Off;
        self.last_language = None;
    }

    /// Tracks the host should attach to the media element
    pub fn track_list(&self) -> &[SubtitleTrack] {
        &self.tracks
    }

    pub fn selection(&self) -> &SubtitleSelection {
        &self.selection
    }

    pub fn track(&self, language: &str) -> Option<&SubtitleTrack> {
        self.tracks.iter().find(|track| track.language == language)
    }

    /// Record a selection without touching the element
    pub fn select(&mut self, selection: SubtitleSelection) -> PlayerResult<()> {
        if let SubtitleSelection::Language(language) = &selection {
            if self.track(language).is_none() {
                return Err(PlayerError::UnknownSubtitle(language.clone()));
            }
            self.last_language = Some(language.clone());
        }
        self.selection = selection;
        Ok(())
    }

    pub fn set_track(
        &mut self,
        selection: SubtitleSelection,
        media: &mut dyn MediaElement,
    ) -> PlayerResult<()> {
        self.select(selection)?;
        self.refresh(media);
        Ok(())
    }

    /// Set the mode of every attached text track: the selected language is
    /// `Showing` (first match only), everything else `Hidden`.
    pub fn refresh(&self, media: &mut dyn MediaElement) {
        let wanted = self.selection.language();
        let mut shown = false;
        for (index, language) in
            media.text_track_languages().iter().enumerate()
        {
            let mode = if !shown && wanted == Some(language.as_str()) {
                shown = true;
                TextTrackMode::Showing
            } else {
                TextTrackMode::Hidden
            };
            media.set_text_track_mode(index, mode);
        }
        debug!("Subtitle modes refreshed, showing {:?}", wanted);
    }

    /// Off, then each track in order, then Off again
    pub fn next_in_cycle(&self) -> SubtitleSelection {
        let next_index = match self.selection.language() {
            None => Some(0),
            Some(current) => self
                .tracks
                .iter()
                .position(|track| track.language == current)
                .map(|index| index + 1),
        };
        next_index
            .and_then(|index| self.tracks.get(index))
            .map(|track| SubtitleSelection::Language(track.language.clone()))
            .unwrap_or(SubtitleSelection::Off)
    }

    /// Selection `toggle` would switch to: Off when something is shown,
    /// otherwise the last used (or first) language.
    pub fn toggled(&self) -> SubtitleSelection {
        if !self.selection.is_off() {
            return SubtitleSelection::Off;
        }
        self.last_language
            .clone()
            .or_else(|| self.tracks.first().map(|track| track.language.clone()))
            .map(SubtitleSelection::Language)
            .unwrap_or(SubtitleSelection::Off)
    }

    pub fn describe(&self, selection: &SubtitleSelection) -> String {
        match selection.language() {
            None => "Off".to_string(),
            Some(language) => self
                .track(language)
                .map(|track| track.label.clone())
                .unwrap_or_else(|| language.to_string()),
        }
    }
}
