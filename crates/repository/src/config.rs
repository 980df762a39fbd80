//! Repository configuration loaded from TOML.

use crate::{Backends, Error, FeatureFlag, MemoryStore, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Repository configuration.
///
/// ```toml
/// [sqlite]
/// path = "articles.db"
///
/// [flags]
/// sqlite = true
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// SQLite backend; calls use the memory backend when absent.
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,

    /// Runtime switches.
    #[serde(default)]
    pub flags: Flags,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SqliteConfig {
    /// Database file.
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flags {
    /// Serve calls from sqlite when it is configured.
    #[serde(default = "default_true")]
    pub sqlite: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self { sqlite: true }
    }
}

fn default_true() -> bool {
    true
}

impl RepositoryConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self> {
        toml::from_str(toml).map_err(|e| Error::Config(e.to_string()))
    }

    /// Build the backends this configuration describes.
    pub fn backends(&self) -> Backends {
        let backends =
            Backends::new(MemoryStore::new()).with_flag(FeatureFlag::new(self.flags.sqlite));
        match &self.sqlite {
            Some(sqlite) => backends.with_sqlite(&sqlite.path),
            None => backends,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml() {
        let config = RepositoryConfig::parse(
            r#"
[sqlite]
path = "/tmp/articles.db"

[flags]
sqlite = false
"#,
        )
        .unwrap();

        let backends = config.backends();
        assert_eq!(
            backends.sqlite_path().map(|p| p.as_path()),
            Some(Path::new("/tmp/articles.db"))
        );
        assert!(!backends.flag().is_enabled());
    }

    #[test]
    fn test_defaults_to_memory() {
        let config = RepositoryConfig::parse("").unwrap();
        let backends = config.backends();
        assert!(backends.sqlite_path().is_none());
        assert!(backends.flag().is_enabled());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            RepositoryConfig::parse("[sqlite]\npath = 3"),
            Err(Error::Config(_))
        ));
    }
}
