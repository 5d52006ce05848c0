//! Application settings and configuration management

use crate::topology::{ConvergencePolicy, DesiredTopology, SettleDelays};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A named group the operator can apply without picking speakers.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Preset {
    pub name: String,
    #[serde(flatten)]
    pub topology: DesiredTopology,
}

/// How convergence after group formation is confirmed
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ConvergenceSettings {
    #[default]
    Fixed,
    Poll { interval_ms: u64, timeout_ms: u64 },
}

/// Application settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Settings {
    /// Base URL of the Sonos HTTP API
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_dissolve_settle_ms")]
    pub dissolve_settle_ms: u64,
    #[serde(default = "default_formation_settle_ms")]
    pub formation_settle_ms: u64,
    #[serde(default = "default_resume_settle_ms")]
    pub resume_settle_ms: u64,
    #[serde(default = "default_queue_settle_ms")]
    pub queue_settle_ms: u64,
    #[serde(default)]
    pub convergence: ConvergenceSettings,
    /// Track to start after grouping instead of resuming the current queue
    #[serde(default)]
    pub track_uri: Option<String>,
    #[serde(default)]
    pub presets: Vec<Preset>,
}

fn default_api_url() -> String {
    "http://127.0.0.1:5005".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_dissolve_settle_ms() -> u64 {
    1000
}

fn default_formation_settle_ms() -> u64 {
    2000
}

fn default_resume_settle_ms() -> u64 {
    3000
}

fn default_queue_settle_ms() -> u64 {
    1000
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

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_url: default_api_url(),
            request_timeout_secs: default_request_timeout_secs(),
            dissolve_settle_ms: default_dissolve_settle_ms(),
            formation_settle_ms: default_formation_settle_ms(),
            resume_settle_ms: default_resume_settle_ms(),
            queue_settle_ms: default_queue_settle_ms(),
            convergence: ConvergenceSettings::Fixed,
            track_uri: None,
            presets: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from a file, falling back to defaults when it does not exist
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

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, content)?;
        Ok(())
    }

    /// Get the default config file path
    pub fn default_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        config_dir.join("sonos-grouper").join("config.json")
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_url.is_empty() {
            return Err(ConfigError::ValidationError("API URL cannot be empty".to_string()));
        }

        let parsed = url::Url::parse(&self.api_url)
            .map_err(|e| ConfigError::ValidationError(format!("Invalid API URL '{}': {}", self.api_url, e)))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ConfigError::ValidationError(format!(
                "API URL must use http or https, got '{}'",
                parsed.scheme()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "Request timeout must be at least one second".to_string(),
            ));
        }

        if self.formation_settle_ms < self.dissolve_settle_ms
            || self.resume_settle_ms <= self.formation_settle_ms
        {
            return Err(ConfigError::ValidationError(
                "Settle delays must grow: dissolve <= formation < resume".to_string(),
            ));
        }

        if let ConvergenceSettings::Poll { interval_ms, timeout_ms } = self.convergence {
            if interval_ms == 0 || timeout_ms < interval_ms {
                return Err(ConfigError::ValidationError(
                    "Poll interval must be non-zero and not exceed the timeout".to_string(),
                ));
            }
        }

        for (index, preset) in self.presets.iter().enumerate() {
            if preset.name.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!("Preset #{} has no name", index + 1)));
            }
            if self.presets[..index].iter().any(|p| p.name == preset.name) {
                return Err(ConfigError::ValidationError(format!(
                    "Preset '{}' is defined twice",
                    preset.name
                )));
            }
        }

        Ok(())
    }

    pub fn find_preset(&self, name: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.name == name)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn settle_delays(&self) -> SettleDelays {
        SettleDelays {
            dissolve: Duration::from_millis(self.dissolve_settle_ms),
            formation: Duration::from_millis(self.formation_settle_ms),
            resume: Duration::from_millis(self.resume_settle_ms),
            queue: Duration::from_millis(self.queue_settle_ms),
        }
    }

    pub fn convergence_policy(&self) -> ConvergencePolicy {
        match self.convergence {
            ConvergenceSettings::Fixed => ConvergencePolicy::Fixed,
            ConvergenceSettings::Poll { interval_ms, timeout_ms } => ConvergencePolicy::Poll {
                interval: Duration::from_millis(interval_ms),
                timeout: Duration::from_millis(timeout_ms),
            },
        }
    }
}
