//! Repository capabilities for bound service functions.
//!
//! This crate supplies the `author` and `article` capabilities and the
//! [`Repository`] binder variant that resolves them. Service code declares
//! which of the two it needs and receives a [`Binder<Repository>`] with the
//! [`RepositoryExt`] accessors.
//!
//! # Backends
//!
//! - [`MemoryStore`] — shared in-process maps. Publishing accepts any uuid.
//! - [`SqliteStore`] — author and article tables. Each bound call opens its
//!   own connection inside a transaction ([`SqliteScope`]) that commits on
//!   success and rolls back otherwise.
//!
//! Which backend serves a call is decided when the call's scope opens, from a
//! runtime [`FeatureFlag`]. The decision holds for the whole call.
//!
//! # Example
//!
//! ```
//! use binder::Binder;
//! use repository::{Backends, MemoryStore, ModuleName, Repository, RepositoryExt, Result};
//! use uuid::Uuid;
//!
//! fn publish(bind: &mut Binder<Repository>, uuid: Uuid) -> Result<bool> {
//!     bind.article()?.publish(uuid)
//! }
//!
//! let backends = Backends::new(MemoryStore::new());
//! let publish = backends.module().allow([ModuleName::Article])?.wrap(publish)?;
//! assert!(publish.call(Uuid::new_v4())?);
//! # Ok::<(), repository::Error>(())
//! ```
//!
//! [`Binder<Repository>`]: binder::Binder

mod config;
mod error;
mod memory;
mod protocol;
mod repository;
mod store;

pub use config::{Flags, RepositoryConfig, SqliteConfig};
pub use error::{Error, Result};
pub use memory::MemoryStore;
pub use protocol::{ArticleModule, AuthorModule};
pub use repository::{
    Article, Author, Backend, Backends, FeatureFlag, ModuleName, Repository, RepositoryExt,
};
pub use store::{SqliteScope, SqliteStore};
