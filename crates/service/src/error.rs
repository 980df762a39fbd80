use thiserror::Error;

/// Service errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Repository(#[from] repository::Error),

    #[error(transparent)]
    Binding(#[from] binder::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
