//! CLI error types.

use crate::config::ConfigError;
use thiserror::Error;

/// CLI errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The command needs the sqlite backend but none is configured.
    #[error("no sqlite database configured. Set [sqlite] path in binder.toml")]
    NoDatabase,

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A bound service call failed.
    #[error(transparent)]
    Service(#[from] service::Error),

    /// An error occurred in the repository layer.
    #[error(transparent)]
    Repository(#[from] repository::Error),

    /// A service could not be bound.
    #[error(transparent)]
    Binding(#[from] binder::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
