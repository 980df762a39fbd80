//! Configuration loading from binder.toml.

use repository::RepositoryConfig;
use serde::Deserialize;
use std::path::Path;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,

    /// Repository backends and flags.
    #[serde(flatten)]
    pub repository: RepositoryConfig,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
pub struct LogConfig {
    /// Filter directives, overridden by `RUST_LOG`.
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
