//! Configuration for the frontend core

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub audio: AudioConfig,
    pub video: VideoConfig,
    pub paths: PathConfig,
}

/// General session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Flush backup memory when the host reports it dirty, in addition
    /// to the unconditional flush at content close.
    pub flush_backup_on_dirty: bool,
}

/// Host audio settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Host output sample rate in Hz.
    pub host_rate: u32,
}

/// Host video settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Host presentation rate in Hz; with the emulated rate it determines
    /// the engine's audio sample count per frame.
    pub host_refresh_rate: f64,
    /// First visible scanline row.
    pub visible_lines_first: u32,
    /// Last visible scanline row, inclusive.
    pub visible_lines_last: u32,
    /// Scale vertical aspect so the visible line count maps to the
    /// standard 224-line picture height.
    pub correct_line_aspect: bool,
}

/// Filesystem paths
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct PathConfig {
    /// System card image required for CD content.
    pub system_card: PathBuf,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            flush_backup_on_dirty: true,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { host_rate: 48_000 }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            host_refresh_rate: 60.0,
            visible_lines_first: 11,
            visible_lines_last: 234,
            correct_line_aspect: false,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        tracing::debug!("loaded configuration from {}", path.display());
        Self::from_toml(&text)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Visible scanline count for the configured line range.
    pub fn visible_line_count(&self) -> u32 {
        self.video.visible_lines_last - self.video.visible_lines_first + 1
    }
}
