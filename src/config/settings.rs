//! Application settings and configuration management

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::session::{MAX_PLAYBACK_RATE, MIN_PLAYBACK_RATE};

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
    /// Initial volume, 0.0 to 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_playback_rate")]
    pub playback_rate: f64,
    /// Continue with the next playlist item when a video ends
    #[serde(default = "default_true")]
    pub auto_advance: bool,
    /// Show the first subtitle track found for a video
    #[serde(default = "default_true")]
    pub auto_enable_first_subtitle: bool,
    /// Delay before an attached subtitle file is switched on
    #[serde(default = "default_activation_grace_ms")]
    pub subtitle_activation_grace_ms: u64,
    /// Extra directories searched for subtitle files matching a video
    #[serde(default)]
    pub sidecar_search_dirs: Vec<PathBuf>,
    #[serde(default = "default_state_update_capacity")]
    pub state_update_capacity: usize,
    #[serde(default = "default_command_buffer_size")]
    pub command_buffer_size: usize,
    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_volume() -> f64 {
    0.8
}

fn default_playback_rate() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

fn default_activation_grace_ms() -> u64 {
    100
}

fn default_state_update_capacity() -> usize {
    64
}

fn default_command_buffer_size() -> usize {
    32
}

fn default_log_filter() -> String {
    "r_vidplay=info".to_string()
}

/// Error types for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    IoError(io::Error),
    ParseError(String),
    ValidationError(String),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "I/O error: {}", e),
            ConfigError::ParseError(s) => write!(f, "Parse error: {}", s),
            ConfigError::ValidationError(s) => write!(f, "Validation error: {}", s),
        }
    }
}

impl Error for ConfigError {}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            volume: default_volume(),
            playback_rate: default_playback_rate(),
            auto_advance: true,
            auto_enable_first_subtitle: true,
            subtitle_activation_grace_ms: default_activation_grace_ms(),
            sidecar_search_dirs: Vec::new(),
            state_update_capacity: default_state_update_capacity(),
            command_buffer_size: default_command_buffer_size(),
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        Ok(settings)
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(&self)?;

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        home.join(".config").join("vidplay").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::ValidationError(format!(
                "Volume must be between 0 and 1, got {}",
                self.volume
            )));
        }

        if !(MIN_PLAYBACK_RATE..=MAX_PLAYBACK_RATE).contains(&self.playback_rate) {
            return Err(ConfigError::ValidationError(format!(
                "Playback rate must be between {} and {}, got {}",
                MIN_PLAYBACK_RATE, MAX_PLAYBACK_RATE, self.playback_rate
            )));
        }

        if self.state_update_capacity == 0 || self.command_buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "Channel capacities must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
