use url::Url;

/// Alternate audio rendition reported by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AudioTrack {
    pub id: usize,
    pub label: String,
    pub language: Option<String>,
}

impl AudioTrack {
    /// Build a track, falling back to the language name or position when the
    /// playlist carries no NAME attribute
    pub fn new(
        id: usize,
        name: Option<String>,
        language: Option<String>,
    ) -> Self {
        let label = match (&name, &language) {
            (Some(name), _) if !name.trim().is_empty() => name.clone(),
            (_, Some(lang)) => subtitle_language_label(lang),
            _ => format!("Track {}", id + 1),
        };
        Self {
            id,
            label,
            language,
        }
    }
}

/// Side-loaded subtitle file for one language
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubtitleTrack {
    pub language: String,
    pub label: String,
    pub url: Url,
}

impl SubtitleTrack {
    pub fn new(language: impl Into<String>, url: Url) -> Self {
        let language = language.into();
        let label = subtitle_language_label(&language);
        Self {
            language,
            label,
            url,
        }
    }
}

/// Which subtitle track should be rendered
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SubtitleSelection {
    #[default]
    Off,
    Language(String),
}

impl SubtitleSelection {
    pub fn language(&self) -> Option<&str> {
        match self {
            SubtitleSelection::Off => None,
            SubtitleSelection::Language(code) => Some(code.as_str()),
        }
    }

    pub fn is_off(&self) -> bool {
        matches!(self, SubtitleSelection::Off)
    }
}

/// Mode of a text track on the media element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum TextTrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

/// Convert a subtitle language code to a display label.
///
/// Only the languages the catalog ships subtitles for are translated; any
/// other code is displayed as-is.
pub fn subtitle_language_label(code: &str) -> String {
    match code.to_lowercase().as_str() {
        "en" => "English",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "it" => "Italian",
        "pt" => "Portuguese",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh" => "Chinese",
        _ => code,
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_languages_get_display_names() {
        assert_eq!(subtitle_language_label("en"), "English");
        assert_eq!(subtitle_language_label("JA"), "Japanese");
        assert_eq!(subtitle_language_label("zh"), "Chinese");
    }

    #[test]
    fn unknown_language_is_shown_verbatim() {
        assert_eq!(subtitle_language_label("pt-BR"), "pt-BR");
        assert_eq!(subtitle_language_label("tlh"), "tlh");
    }

    #[test]
    fn audio_label_falls_back_to_language_then_position() {
        assert_eq!(
            AudioTrack::new(0, Some("Director commentary".into()), None).label,
            "Director commentary"
        );
        assert_eq!(AudioTrack::new(1, None, Some("fr".into())).label, "French");
        assert_eq!(AudioTrack::new(2, Some("  ".into()), None).label, "Track 3");
    }
}
