use anyhow::{Context, anyhow};
use log::info;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use super::sections::{
    BufferingConfig, ControlsConfig, SeekConfig, StartupConfig, SwitchConfig,
    WatchSyncConfig,
};

pub const CONFIG_PATH_ENV: &str = "LUMEN_PLAYER_CONFIG_PATH";
pub const CONFIG_JSON_ENV: &str = "LUMEN_PLAYER_CONFIG_JSON";

/// Source that produced the player configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PlayerConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// All tuning knobs of the playback controller. Sections that are missing
/// from a config file keep their defaults.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub startup: StartupConfig,
    pub buffering: BufferingConfig,
    pub switching: SwitchConfig,
    pub seek: SeekConfig,
    pub watch_sync: WatchSyncConfig,
    pub controls: ControlsConfig,
}

impl PlayerConfig {
    /// Load player configuration overrides using environment variables.
    /// Evaluation order:
    /// 1) `$LUMEN_PLAYER_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$LUMEN_PLAYER_CONFIG_JSON` (inline JSON),
    /// 3) `player.toml`/`player.json` in the working directory or `config/`,
    /// 4) defaults.
    pub fn load_from_env() -> anyhow::Result<(Self, PlayerConfigSource)> {
        let (config, source) = Self::resolve()?;
        config
            .validate()
            .with_context(|| format!("invalid player config from {source:?}"))?;
        info!("Loaded player config from {:?}", source);
        Ok((config, source))
    }

    fn resolve() -> anyhow::Result<(Self, PlayerConfigSource)> {
        if let Ok(path_str) = env::var(CONFIG_PATH_ENV)
            && !path_str.trim().is_empty()
        {
            let path = PathBuf::from(path_str);
            let config = Self::load_from_file(&path)?;
            return Ok((config, PlayerConfigSource::EnvPath(path)));
        }

        if let Ok(raw) = env::var(CONFIG_JSON_ENV)
            && !raw.trim().is_empty()
        {
            let parsed = Self::parse_json(&raw)
                .with_context(|| format!("failed to parse {CONFIG_JSON_ENV}"))?;
            return Ok((parsed, PlayerConfigSource::EnvInline));
        }

        if let Some(path) = Self::find_default_file() {
            let config = Self::load_from_file(&path)?;
            return Ok((config, PlayerConfigSource::File(path)));
        }

        Ok((Self::default(), PlayerConfigSource::Default))
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path).with_context(|| {
            format!("failed to read player config from {}", path.display())
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::parse_json(&contents).with_context(|| {
                format!("invalid player config {}", path.display())
            }),
            Some("toml") => toml::from_str(&contents).map_err(|err| {
                anyhow!("invalid player config {}: {}", path.display(), err)
            }),
            _ => Self::parse_from_str(&contents, &path.display().to_string()),
        }
    }

    /// Try TOML first, then JSON.
    pub fn parse_from_str(
        contents: &str,
        origin: &str,
    ) -> anyhow::Result<Self> {
        toml::from_str(contents).or_else(|toml_err| {
            serde_json::from_str(contents).map_err(|json_err| {
                anyhow!(
                    "failed to parse player config {}: toml error: {}; json error: {}",
                    origin,
                    toml_err,
                    json_err
                )
            })
        })
    }

    pub fn parse_json(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw)
            .map_err(|err| anyhow!("invalid player config json: {err}"))
    }

    fn find_default_file() -> Option<PathBuf> {
        const CANDIDATES: &[&str] = &[
            "player.toml",
            "player.json",
            "config/player.toml",
            "config/player.json",
        ];

        CANDIDATES
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }
}
