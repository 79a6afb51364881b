use crate::{DynaMockError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = ".dynamock.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub diagnostics: DiagnosticsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct DiagnosticsConfig {
    /// Warn whenever a mocked call falls back to the real implementation
    /// because an argument pattern failed to evaluate
    #[serde(default)]
    pub report_match_failures: bool,
    /// Emit a trace event for every routing decision
    #[serde(default)]
    pub trace_routing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Fallback level when `RUST_LOG` is not set
    #[serde(default = "default_level")]
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from a file in the project root
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(DEFAULT_CONFIG_FILE))
    }

    /// Load configuration from `config_path`; a missing file yields the defaults
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            DynaMockError::ConfigFile(format!(
                "Failed to read config file {:?}: {}",
                config_path, e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            DynaMockError::ConfigFile(format!(
                "Failed to parse TOML config from {:?}: {}",
                config_path, e
            ))
        })?;

        Ok(config)
    }

    /// Load default config if file is missing, otherwise return error on parse failure
    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                warn!("Failed to load config: {}. Using defaults.", e);
                Config::default()
            }
        }
    }
}
