//! Configuration management for the media console

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::capture::format::DEFAULT_PREFERENCES;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsoleConfig {
    /// Playback behaviour
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Camera recording
    #[serde(default)]
    pub recording: RecordingConfig,

    /// Persistent state location
    #[serde(default)]
    pub storage: StorageConfig,

    /// Path to config file (not serialized)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Bounded wait after the transport confirms an unbind, before the next
    /// source is bound. Workaround for surfaces that release hardware late.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,

    /// Step used by the backward/forward skip buttons
    #[serde(default = "default_skip_seconds")]
    pub skip_seconds: f64,

    /// Volume used when nothing has been persisted yet
    #[serde(default = "default_volume")]
    pub initial_volume: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// How often the recorder flushes a chunk (ms)
    #[serde(default = "default_timeslice")]
    pub timeslice_ms: u64,

    /// Ordered mime type preferences, most preferred first
    #[serde(default = "default_preferred_formats")]
    pub preferred_formats: Vec<String>,

    /// Where finished recordings are written. Falls back to the user's
    /// download directory.
    #[serde(default)]
    pub output_directory: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory for the key-value state files
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

// Default value functions
fn default_settle_delay() -> u64 {
    100
}

fn default_skip_seconds() -> f64 {
    30.0
}

fn default_volume() -> f64 {
    1.0
}

fn default_timeslice() -> u64 {
    1000
}

fn default_preferred_formats() -> Vec<String> {
    DEFAULT_PREFERENCES.iter().map(|s| s.to_string()).collect()
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay(),
            skip_seconds: default_skip_seconds(),
            initial_volume: default_volume(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            timeslice_ms: default_timeslice(),
            preferred_formats: default_preferred_formats(),
            output_directory: None,
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from default location or create default
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let mut config = ConsoleConfig::default();
            config.config_path = Some(config_path);
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let mut config: ConsoleConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let config_path = self.config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(&config_path, contents)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    /// Get the config file path
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config_path {
            Some(path) => Ok(path.clone()),
            None => Self::default_config_path(),
        }
    }

    /// Directory holding persisted console state
    pub fn storage_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.storage.directory {
            return Ok(dir.clone());
        }

        let proj_dirs = Self::project_dirs()?;
        Ok(proj_dirs.data_dir().join("state"))
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.playback.settle_delay_ms)
    }

    pub fn timeslice(&self) -> Duration {
        // A zero timeslice would spin the recorder loop
        Duration::from_millis(self.recording.timeslice_ms.max(1))
    }

    fn default_config_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    fn project_dirs() -> Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("dev", "media-console", "console")
            .context("Failed to determine config directory")
    }
}
