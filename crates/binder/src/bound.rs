//! Bound functions: the wrappers that run a target inside a binding scope.

use crate::{AllowList, Binder, Declaration, Error, Outcome, Variant};
use futures::future::BoxFuture;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

/// A blocking function bound to a declaration.
///
/// Each call builds a fresh [`Binder`], opens its scope, runs the target and
/// closes the scope before returning. Panics in the target close the scope
/// with [`Outcome::Aborted`] while unwinding.
pub struct Bound<V: Variant, F, A> {
    declaration: Declaration<V>,
    target: F,
    _args: PhantomData<fn(A)>,
}

impl<V: Variant, F, A> Bound<V, F, A> {
    pub(crate) fn new(declaration: Declaration<V>, target: F) -> Self {
        Self {
            declaration,
            target,
            _args: PhantomData,
        }
    }

    /// Path of the bound target.
    pub fn name(&self) -> &'static str {
        type_name::<F>()
    }

    pub fn allow_list(&self) -> &AllowList<V::Name> {
        self.declaration.allow_list()
    }

    /// Run the target with a fresh binder injected.
    pub fn call<T, E>(&self, args: A) -> std::result::Result<T, E>
    where
        F: Fn(&mut Binder<V>, A) -> std::result::Result<T, E>,
        T: Send + Sync + 'static,
        E: From<Error> + std::error::Error + Send + Sync + 'static,
    {
        let mut binder = self.declaration.open();
        binder.enter()?;
        let result = (self.target)(&mut binder, args);
        binder.exit(Outcome::of(&result));
        result
    }
}

impl<V: Variant, F, A> fmt::Debug for Bound<V, F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("name", &self.name())
            .field("allowed", self.allow_list())
            .finish()
    }
}

/// A future-returning function bound to a declaration.
///
/// The scope opens before the target's future is first polled and closes
/// after it completes. If the call is dropped while suspended, the binder
/// closes the scope with [`Outcome::Aborted`].
pub struct BoundAsync<V: Variant, F, A> {
    declaration: Declaration<V>,
    target: F,
    _args: PhantomData<fn(A)>,
}

impl<V: Variant, F, A> BoundAsync<V, F, A> {
    pub(crate) fn new(declaration: Declaration<V>, target: F) -> Self {
        Self {
            declaration,
            target,
            _args: PhantomData,
        }
    }

    /// Path of the bound target.
    pub fn name(&self) -> &'static str {
        type_name::<F>()
    }

    pub fn allow_list(&self) -> &AllowList<V::Name> {
        self.declaration.allow_list()
    }

    /// Run the target with a fresh binder injected.
    pub async fn call<T, E>(&self, args: A) -> std::result::Result<T, E>
    where
        F: for<'b> Fn(&'b mut Binder<V>, A) -> BoxFuture<'b, std::result::Result<T, E>>,
        T: Send + Sync + 'static,
        E: From<Error> + std::error::Error + Send + Sync + 'static,
    {
        let mut binder = self.declaration.open();
        binder.enter_async().await?;
        let result = (self.target)(&mut binder, args).await;
        binder.exit_async(Outcome::of(&result)).await;
        result
    }
}

impl<V: Variant, F, A> fmt::Debug for BoundAsync<V, F, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundAsync")
            .field("name", &self.name())
            .field("allowed", self.allow_list())
            .finish()
    }
}
