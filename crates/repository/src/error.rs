use thiserror::Error;

/// Repository errors.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Config(String),

    #[error("unknown module: {0}")]
    UnknownModule(String),

    #[error(transparent)]
    Binding(#[from] binder::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
