// Configuration management
//
// Frontend settings loaded from a TOML file. Values that can be changed from
// the options menu (APU, low-pass filter, frameskip) only provide the startup
// state; the keymap selection is persisted separately by the settings store.

use crate::audio::{AudioMode, AUDIO_SAMPLE_RATE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

/// Default configuration file path
pub const CONFIG_FILE: &str = "snes_go.toml";

/// Errors raised while reading or writing configuration files
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// File is not valid TOML for the expected shape
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be serialized
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Parsed, but a value is out of range or unknown
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Frontend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FrontendConfig {
    /// Video settings
    pub video: VideoConfig,

    /// Audio settings
    pub audio: AudioConfig,

    /// File locations
    pub paths: PathsConfig,
}

/// Video configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// Present one frame out of every `frameskip` (at least 1)
    pub frameskip: u32,

    /// Loop cadence in frames per second
    pub target_fps: u32,

    /// Desktop window scale (1-4)
    pub scale: u32,

    /// Enable VSync on the desktop surface
    pub vsync: bool,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            frameskip: 3,
            target_fps: 60,
            scale: 3,
            vsync: false,
        }
    }
}

/// Audio configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Run the APU and produce sound
    pub enabled: bool,

    /// Mix through the low-pass filter
    pub lowpass_filter: bool,

    /// Output rate in Hz
    pub sample_rate: u32,

    /// Per-frame or on-demand submission
    pub mode: AudioMode,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            lowpass_filter: false,
            sample_rate: AUDIO_SAMPLE_RATE,
            mode: AudioMode::PerFrame,
        }
    }
}

/// File locations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Screenshot directory
    pub screenshots: PathBuf,

    /// Persisted settings (keymap index)
    pub settings: PathBuf,

    /// Optional keymap profiles file
    pub keymaps: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            screenshots: PathBuf::from("screenshots"),
            settings: PathBuf::from("settings.json"),
            keymaps: PathBuf::from("keymaps.toml"),
        }
    }
}

impl FrontendConfig {
    /// Load configuration from file or create default
    ///
    /// If the file doesn't exist or cannot be parsed, the default
    /// configuration is used. A missing file is created with the defaults;
    /// a broken one is left untouched.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                info!(path = %path.display(), "loaded configuration");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "using default configuration");
                let config = Self::default();
                // A missing file is recreated; a broken one is left for the user to fix
                if !path.exists() {
                    if let Err(e) = config.save(path) {
                        warn!(error = %e, "could not save default configuration");
                    }
                }
                config
            }
        }
    }

    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: FrontendConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.video.target_fps == 0 {
            return Err(ConfigError::Invalid("video.target_fps must be at least 1".into()));
        }
        if self.audio.sample_rate < self.video.target_fps {
            return Err(ConfigError::Invalid(format!(
                "audio.sample_rate {} is below one sample per frame",
                self.audio.sample_rate
            )));
        }
        if !(1..=4).contains(&self.video.scale) {
            return Err(ConfigError::Invalid(format!(
                "video.scale {} is outside 1-4",
                self.video.scale
            )));
        }
        Ok(())
    }

    /// Length of one frame in microseconds
    pub fn frame_interval_us(&self) -> i64 {
        1_000_000 / i64::from(self.video.target_fps.max(1))
    }
}
