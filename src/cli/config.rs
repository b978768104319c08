//! Configuration management for TriageBuddy
//!
//! TOML configuration with defaults and validation.
//! Location: ~/.triagebuddy/config.toml

use crate::cli::args::Verbosity;
use crate::errors::{Result, TriageError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Complete configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Ollama connection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaConfig {
    pub host: String,
    pub port: u16,
    pub model: String,
    pub timeout_secs: u64,
}

/// Wizard behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub kiosk: bool,
}

/// Terminal output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub default_verbosity: String,
    pub show_progress_bars: bool,
    pub color_output: bool,
}

/// File system paths configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub state_dir: String,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            model: "qwen2.5:7b-instruct".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_verbosity: "normal".to_string(),
            show_progress_bars: true,
            color_output: true,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state_dir: "~/.triagebuddy".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(config_path),
            None => Self::load_default(),
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| TriageError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| TriageError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load from the standard location, or built-in defaults if absent
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::default_path() {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        Ok(Config::default())
    }

    /// Standard config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".triagebuddy").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.ollama.port == 0 {
            return Err(TriageError::ConfigError(
                "ollama.port must be greater than 0".to_string(),
            ));
        }

        if self.ollama.timeout_secs == 0 {
            return Err(TriageError::ConfigError(
                "ollama.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.ollama.model.trim().is_empty() {
            return Err(TriageError::ConfigError(
                "ollama.model must not be empty".to_string(),
            ));
        }

        if Verbosity::from_str_opt(&self.telemetry.default_verbosity).is_none() {
            return Err(TriageError::ConfigError(format!(
                "Invalid verbosity level: {}",
                self.telemetry.default_verbosity
            )));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| TriageError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TriageError::ConfigError(format!("Failed to create config dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| TriageError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.ollama.timeout_secs)
    }

    /// Verbosity from the file, normal if unrecognized
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_str_opt(&self.telemetry.default_verbosity).unwrap_or(Verbosity::Normal)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Readline history file
    pub fn history_path(&self) -> PathBuf {
        self.state_dir().join("history")
    }
}
