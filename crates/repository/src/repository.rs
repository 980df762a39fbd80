//! The repository binder variant and its capabilities.

use crate::{ArticleModule, AuthorModule, Error, MemoryStore, SqliteScope};
use binder::{Binder, Capability, Module, Outcome, Variant};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error};

/// Capabilities the repository can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleName {
    Author,
    Article,
}

impl fmt::Display for ModuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModuleName::Author => "author",
            ModuleName::Article => "article",
        })
    }
}

impl FromStr for ModuleName {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "author" => Ok(ModuleName::Author),
            "article" => Ok(ModuleName::Article),
            other => Err(Error::UnknownModule(other.to_string())),
        }
    }
}

/// A runtime switch shared between the configuration and every call.
#[derive(Debug, Clone, Default)]
pub struct FeatureFlag(Arc<AtomicBool>);

impl FeatureFlag {
    pub fn new(enabled: bool) -> Self {
        Self(Arc::new(AtomicBool::new(enabled)))
    }

    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, enabled: bool) {
        self.0.store(enabled, Ordering::Release);
    }
}

/// Which backend served a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Memory,
    Sqlite,
}

/// Backends available to repository calls.
///
/// The memory store is always present. The sqlite database serves calls
/// while `flag` is enabled.
#[derive(Debug, Clone)]
pub struct Backends {
    memory: MemoryStore,
    sqlite: Option<PathBuf>,
    flag: FeatureFlag,
}

impl Backends {
    pub fn new(memory: MemoryStore) -> Self {
        Self {
            memory,
            sqlite: None,
            flag: FeatureFlag::new(true),
        }
    }

    pub fn with_sqlite(mut self, path: impl Into<PathBuf>) -> Self {
        self.sqlite = Some(path.into());
        self
    }

    pub fn with_flag(mut self, flag: FeatureFlag) -> Self {
        self.flag = flag;
        self
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.memory
    }

    pub fn flag(&self) -> &FeatureFlag {
        &self.flag
    }

    pub fn sqlite_path(&self) -> Option<&PathBuf> {
        self.sqlite.as_ref()
    }

    /// A module building one [`Repository`] per call over these backends.
    pub fn module(&self) -> Module<Repository> {
        let backends = self.clone();
        Module::new(move || Repository::new(backends.clone()))
    }
}

/// Binder variant over the author and article capabilities.
///
/// The backend is chosen once per call when the scope opens. A sqlite-backed
/// call runs in a transaction that commits when the call returns and rolls
/// back when it fails or aborts.
pub struct Repository {
    backends: Backends,
    backend: Backend,
    scope: Option<SqliteScope>,
}

impl Repository {
    pub fn new(backends: Backends) -> Self {
        Self {
            backends,
            backend: Backend::Memory,
            scope: None,
        }
    }

    /// Backend serving the current call.
    pub fn backend(&self) -> Backend {
        self.backend
    }
}

impl Variant for Repository {
    type Name = ModuleName;

    fn enter(&mut self) -> binder::Result<()> {
        if self.backends.flag.is_enabled() {
            if let Some(path) = &self.backends.sqlite {
                let scope = SqliteScope::begin(path).map_err(binder::Error::scope)?;
                self.scope = Some(scope);
                self.backend = Backend::Sqlite;
            }
        }
        debug!(backend = ?self.backend, "repository scope running");
        Ok(())
    }

    fn exit(&mut self, outcome: Outcome<'_>) {
        let Some(scope) = self.scope.take() else {
            return;
        };
        if outcome.is_success() {
            if let Err(e) = scope.commit() {
                error!(error = %e, "failed to commit repository scope");
            }
        } else {
            debug!(?outcome, "rolling back repository scope");
            if let Err(e) = scope.rollback() {
                error!(error = %e, "failed to roll back repository scope");
            }
        }
    }
}

/// The author capability.
pub struct Author;

impl Capability<Repository> for Author {
    const NAME: ModuleName = ModuleName::Author;
    type Output = Arc<dyn AuthorModule>;

    fn resolve(repository: &mut Repository) -> binder::Result<Self::Output> {
        let module: Self::Output = match &repository.scope {
            Some(scope) => Arc::new(scope.clone()),
            None => Arc::new(repository.backends.memory.clone()),
        };
        Ok(module)
    }
}

/// The article capability.
pub struct Article;

impl Capability<Repository> for Article {
    const NAME: ModuleName = ModuleName::Article;
    type Output = Arc<dyn ArticleModule>;

    fn resolve(repository: &mut Repository) -> binder::Result<Self::Output> {
        let module: Self::Output = match &repository.scope {
            Some(scope) => Arc::new(scope.clone()),
            None => Arc::new(repository.backends.memory.clone()),
        };
        Ok(module)
    }
}

/// Named accessors for repository-bound functions.
pub trait RepositoryExt {
    fn author(&mut self) -> binder::Result<Arc<dyn AuthorModule>>;
    fn article(&mut self) -> binder::Result<Arc<dyn ArticleModule>>;
}

impl RepositoryExt for Binder<Repository> {
    fn author(&mut self) -> binder::Result<Arc<dyn AuthorModule>> {
        self.get::<Author>()
    }

    fn article(&mut self) -> binder::Result<Arc<dyn ArticleModule>> {
        self.get::<Article>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Result, SqliteStore};
    use uuid::Uuid;

    fn sqlite_backends(dir: &tempfile::TempDir) -> (Backends, PathBuf) {
        let path = dir.path().join("repo.db");
        SqliteStore::open(&path).unwrap().add_author(42, "Ada").unwrap();
        (Backends::new(MemoryStore::new()).with_sqlite(&path), path)
    }

    #[test]
    fn test_module_names_parse_from_display() {
        for name in [ModuleName::Author, ModuleName::Article] {
            assert_eq!(name.to_string().parse::<ModuleName>().unwrap(), name);
        }
        assert!(matches!(
            "comment".parse::<ModuleName>(),
            Err(Error::UnknownModule(name)) if name == "comment"
        ));
    }

    #[test]
    fn test_module_names_deserialize_in_snake_case() {
        #[derive(Deserialize)]
        struct Grants {
            allow: Vec<ModuleName>,
        }

        let grants: Grants = toml::from_str(r#"allow = ["article", "author"]"#).unwrap();
        assert_eq!(grants.allow, [ModuleName::Article, ModuleName::Author]);
    }

    #[test]
    fn test_memory_backend_publishes_any_uuid() {
        let backends = Backends::new(MemoryStore::new());
        let publish = backends
            .module()
            .allow([ModuleName::Article])
            .unwrap()
            .wrap(|bind: &mut Binder<Repository>, uuid: Uuid| -> Result<bool> {
                assert_eq!(bind.variant().backend(), Backend::Memory);
                bind.article()?.publish(uuid)
            })
            .unwrap();

        let uuid = Uuid::new_v4();
        assert!(publish.call(uuid).unwrap());
        assert_eq!(backends.memory().published(), [uuid]);
    }

    #[test]
    fn test_undeclared_module_is_not_granted() {
        let backends = Backends::new(MemoryStore::new());
        let sneaky = backends
            .module()
            .allow([ModuleName::Author])
            .unwrap()
            .wrap(|bind: &mut Binder<Repository>, uuid: Uuid| -> Result<bool> {
                bind.article()?.publish(uuid)
            })
            .unwrap();

        let err = sneaky.call(Uuid::new_v4()).unwrap_err();
        assert!(matches!(
            err,
            Error::Binding(binder::Error::CapabilityNotGranted { ref name }) if name == "article"
        ));
        assert!(backends.memory().published().is_empty());
    }

    #[test]
    fn test_modules_are_cached_per_call() {
        let backends = Backends::new(MemoryStore::new());
        let same = backends
            .module()
            .allow([ModuleName::Author, ModuleName::Article])
            .unwrap()
            .wrap(|bind: &mut Binder<Repository>, (): ()| -> Result<bool> {
                let first = bind.author()?;
                let second = bind.author()?;
                Ok(Arc::ptr_eq(&first, &second))
            })
            .unwrap();

        assert!(same.call(()).unwrap());
    }

    #[test]
    fn test_flag_switches_backend_between_calls() {
        let dir = tempfile::tempdir().unwrap();
        let (backends, _) = sqlite_backends(&dir);
        backends.memory().add_author(42, "Grace");

        let name = backends
            .module()
            .allow([ModuleName::Author])
            .unwrap()
            .wrap(|bind: &mut Binder<Repository>, id: i64| -> Result<String> {
                bind.author()?.get_name(id)
            })
            .unwrap();

        assert_eq!(name.call(42).unwrap(), "Ada");
        backends.flag().set(false);
        assert_eq!(name.call(42).unwrap(), "Grace");
        backends.flag().set(true);
        assert_eq!(name.call(42).unwrap(), "Ada");
    }

    #[test]
    fn test_sqlite_scope_commits_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let (backends, path) = sqlite_backends(&dir);
        let uuid = Uuid::new_v4();
        SqliteStore::open(&path).unwrap().add_article(uuid, "Notes").unwrap();

        let publish = backends
            .module()
            .allow([ModuleName::Article])
            .unwrap()
            .wrap(|bind: &mut Binder<Repository>, uuid: Uuid| -> Result<bool> {
                assert_eq!(bind.variant().backend(), Backend::Sqlite);
                bind.article()?.publish(uuid)
            })
            .unwrap();

        assert!(publish.call(uuid).unwrap());
        assert!(SqliteStore::open(&path).unwrap().published_at(uuid).unwrap().is_some());
        assert!(!publish.call(uuid).unwrap(), "already published");
    }

    #[test]
    fn test_sqlite_scope_rolls_back_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        let (backends, path) = sqlite_backends(&dir);
        let uuid = Uuid::new_v4();
        SqliteStore::open(&path).unwrap().add_article(uuid, "Notes").unwrap();

        let publish_then_fail = backends
            .module()
            .allow([ModuleName::Article, ModuleName::Author])
            .unwrap()
            .wrap(|bind: &mut Binder<Repository>, uuid: Uuid| -> Result<bool> {
                bind.article()?.publish(uuid)?;
                bind.author()?.get_name(7).map(|_| true)
            })
            .unwrap();

        assert!(matches!(publish_then_fail.call(uuid), Err(Error::NotFound(_))));
        assert_eq!(SqliteStore::open(&path).unwrap().published_at(uuid).unwrap(), None);
    }
}
