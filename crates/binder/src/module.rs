//! Modules and the declarations they hand out.

use crate::{AllowList, Binder, Bound, BoundAsync, Error, Result, Variant};
use futures::future::BoxFuture;
use std::any::{TypeId, type_name};
use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Factory for one binder variant.
///
/// A module builds a fresh variant for every bound call and remembers which
/// targets it has already bound. Declarations are made per function through
/// [`Module::allow`], so each function states the minimal set of
/// capabilities it needs.
pub struct Module<V: Variant> {
    factory: Arc<dyn Fn() -> V + Send + Sync>,
    bound: Arc<Mutex<HashSet<TypeId>>>,
}

impl<V: Variant> Module<V> {
    /// Create a module that builds each call's variant with `factory`.
    pub fn new(factory: impl Fn() -> V + Send + Sync + 'static) -> Self {
        Self {
            factory: Arc::new(factory),
            bound: Arc::default(),
        }
    }

    /// Declare the capabilities one function may access.
    ///
    /// At least one name is required; an empty declaration fails with
    /// [`Error::EmptyAllowList`].
    pub fn allow(&self, names: impl IntoIterator<Item = V::Name>) -> Result<Declaration<V>> {
        Ok(Declaration {
            module: self.clone(),
            allowed: Arc::new(AllowList::new(names)?),
        })
    }

    /// Record `F` as bound, failing if it already was.
    ///
    /// A target is identified by its type. Function items and non-capturing
    /// closures are zero-sized, so their type has exactly one value and is
    /// tracked. Other targets are values that must be duplicated to be bound
    /// twice and are not tracked.
    fn claim<F: 'static>(&self) -> Result<()> {
        if size_of::<F>() != 0 {
            return Ok(());
        }
        let mut bound = self.bound.lock().unwrap_or_else(PoisonError::into_inner);
        if !bound.insert(TypeId::of::<F>()) {
            return Err(Error::AlreadyBound {
                target: type_name::<F>(),
            });
        }
        Ok(())
    }

    fn build(&self) -> V {
        (self.factory)()
    }
}

impl<V: Variant + Default> Default for Module<V> {
    fn default() -> Self {
        Self::new(V::default)
    }
}

impl<V: Variant> Clone for Module<V> {
    fn clone(&self) -> Self {
        Self {
            factory: Arc::clone(&self.factory),
            bound: Arc::clone(&self.bound),
        }
    }
}

impl<V: Variant> fmt::Debug for Module<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = self.bound.lock().unwrap_or_else(PoisonError::into_inner).len();
        f.debug_struct("Module")
            .field("variant", &type_name::<V>())
            .field("bound", &bound)
            .finish()
    }
}

/// An allow-list tied to a module, ready to bind a single function.
pub struct Declaration<V: Variant> {
    module: Module<V>,
    allowed: Arc<AllowList<V::Name>>,
}

impl<V: Variant> Declaration<V> {
    pub fn allow_list(&self) -> &AllowList<V::Name> {
        &self.allowed
    }

    /// Bind a blocking target. The returned wrapper runs the whole scope on
    /// the calling thread.
    pub fn wrap<F, A, T, E>(&self, target: F) -> Result<Bound<V, F, A>>
    where
        F: Fn(&mut Binder<V>, A) -> std::result::Result<T, E> + Send + Sync + 'static,
    {
        self.module.claim::<F>()?;
        debug!(function = type_name::<F>(), allowed = %self.allowed, "bound blocking target");
        Ok(Bound::new(self.clone(), target))
    }

    /// Bind a target returning a future. The scope spans the future until it
    /// completes, across every suspension point.
    pub fn wrap_async<F, A, T, E>(&self, target: F) -> Result<BoundAsync<V, F, A>>
    where
        F: for<'b> Fn(&'b mut Binder<V>, A) -> BoxFuture<'b, std::result::Result<T, E>>
            + Send
            + Sync
            + 'static,
    {
        self.module.claim::<F>()?;
        debug!(function = type_name::<F>(), allowed = %self.allowed, "bound async target");
        Ok(BoundAsync::new(self.clone(), target))
    }

    pub(crate) fn open(&self) -> Binder<V> {
        Binder::new(Arc::clone(&self.allowed), self.module.build())
    }
}

impl<V: Variant> Clone for Declaration<V> {
    fn clone(&self) -> Self {
        Self {
            module: self.module.clone(),
            allowed: Arc::clone(&self.allowed),
        }
    }
}

impl<V: Variant> fmt::Debug for Declaration<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Declaration")
            .field("allowed", &self.allowed)
            .finish_non_exhaustive()
    }
}
