//! Binding error types.

use thiserror::Error;

/// Errors raised by the binding machinery itself.
///
/// Failures of the wrapped function never pass through this type: they are
/// handed to the scope-exit hook and returned to the caller unchanged.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new variants
/// in future versions without breaking downstream code.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The target was already bound to an allow-list by the same module.
    #[error("{target} is already bound to an allow-list")]
    AlreadyBound { target: &'static str },

    /// A declaration named no capabilities.
    #[error("an allow-list needs at least one capability")]
    EmptyAllowList,

    /// The capability is not in the allow-list of the running declaration.
    #[error("capability not granted: {name}")]
    CapabilityNotGranted { name: String },

    /// The binder variant could not produce an implementation.
    #[error("failed to resolve capability {name}: {source}")]
    Resolution {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The scope-enter hook failed; the wrapped function was not called.
    #[error("failed to open binding scope: {0}")]
    Scope(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a variant failure raised while resolving `name`.
    pub fn resolution(
        name: impl ToString,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Resolution {
            name: name.to_string(),
            source: source.into(),
        }
    }

    /// Wrap a failure raised by a scope-enter hook.
    pub fn scope(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Scope(source.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
