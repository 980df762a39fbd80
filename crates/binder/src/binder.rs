//! Per-call binder and the scope hooks of binder variants.

use crate::{AllowList, Capability, CapabilityName, Error, Result};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

/// How a bound call finished, as seen by [`Variant::exit`].
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
    /// The target returned this value.
    Returned(&'a (dyn Any + Send + Sync)),
    /// The target failed with this error; it is returned to the caller after exit.
    Failed(&'a (dyn std::error::Error + Send + Sync + 'static)),
    /// The call unwound from a panic or was dropped while suspended.
    Aborted,
}

impl<'a> Outcome<'a> {
    /// Describe a finished call.
    pub fn of<T, E>(result: &'a std::result::Result<T, E>) -> Self
    where
        T: Any + Send + Sync,
        E: std::error::Error + Send + Sync + 'static,
    {
        match result {
            Ok(value) => Outcome::Returned(value),
            Err(error) => Outcome::Failed(error),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Returned(_))
    }

    /// The returned value, if the call returned a `T`.
    pub fn returned<T: Any>(&self) -> Option<&'a T> {
        match *self {
            Outcome::Returned(value) => value.downcast_ref(),
            _ => None,
        }
    }
}

/// A concrete binder: the name set it resolves, plus scope hooks.
///
/// A fresh value is built for every call (see [`Module`](crate::Module)) and
/// dropped once the call's scope has closed. Resolution for each supported
/// name lives in a [`Capability`] impl.
///
/// `exit` runs exactly once for every scope whose `enter` succeeded, no matter
/// how the call ended. It cannot change the outcome. The async hooks default
/// to the blocking ones; only the blocking `exit` runs for
/// [`Outcome::Aborted`], since a dropped future cannot be awaited.
pub trait Variant: Send + 'static {
    /// The closed set of capability names.
    type Name: CapabilityName;

    /// Scope setup, run before the target is invoked.
    fn enter(&mut self) -> Result<()> {
        Ok(())
    }

    /// Scope teardown, run after the target finished.
    fn exit(&mut self, _outcome: Outcome<'_>) {}

    fn enter_async(&mut self) -> impl Future<Output = Result<()>> + Send {
        async move { self.enter() }
    }

    fn exit_async(&mut self, outcome: Outcome<'_>) -> impl Future<Output = ()> + Send {
        async move { self.exit(outcome) }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Idle,
    Open,
    Closed,
}

/// Access object injected as the first argument of a bound function.
///
/// Capabilities are resolved lazily on first access and cached for the rest
/// of the call. Names outside the declaration's allow-list are rejected even
/// when the variant could resolve them.
pub struct Binder<V: Variant> {
    allowed: Arc<AllowList<V::Name>>,
    variant: V,
    resolved: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
    scope: Scope,
}

impl<V: Variant> Binder<V> {
    pub(crate) fn new(allowed: Arc<AllowList<V::Name>>, variant: V) -> Self {
        Self {
            allowed,
            variant,
            resolved: HashMap::new(),
            scope: Scope::Idle,
        }
    }

    /// Access capability `C`, resolving it on first use within this call.
    pub fn get<C: Capability<V>>(&mut self) -> Result<C::Output> {
        if !self.allowed.contains(&C::NAME) {
            return Err(Error::CapabilityNotGranted {
                name: C::NAME.to_string(),
            });
        }

        let key = TypeId::of::<C>();
        if let Some(output) = self
            .resolved
            .get(&key)
            .and_then(|cached| cached.downcast_ref::<C::Output>())
        {
            return Ok(output.clone());
        }

        trace!(capability = %C::NAME, "resolving capability");
        let output = C::resolve(&mut self.variant)?;
        self.resolved.insert(key, Box::new(output.clone()));
        Ok(output)
    }

    /// Whether `name` is in this call's allow-list.
    pub fn is_granted(&self, name: V::Name) -> bool {
        self.allowed.contains(&name)
    }

    pub fn allow_list(&self) -> &AllowList<V::Name> {
        &self.allowed
    }

    /// The variant backing this call.
    pub fn variant(&self) -> &V {
        &self.variant
    }

    pub(crate) fn enter(&mut self) -> Result<()> {
        debug_assert_eq!(self.scope, Scope::Idle);
        self.variant.enter()?;
        self.scope = Scope::Open;
        trace!(allowed = %self.allowed, "binding scope opened");
        Ok(())
    }

    pub(crate) async fn enter_async(&mut self) -> Result<()> {
        debug_assert_eq!(self.scope, Scope::Idle);
        self.variant.enter_async().await?;
        self.scope = Scope::Open;
        trace!(allowed = %self.allowed, "binding scope opened");
        Ok(())
    }

    pub(crate) fn exit(&mut self, outcome: Outcome<'_>) {
        if self.close() {
            self.variant.exit(outcome);
        }
    }

    pub(crate) async fn exit_async(&mut self, outcome: Outcome<'_>) {
        if self.close() {
            self.variant.exit_async(outcome).await;
        }
    }

    fn close(&mut self) -> bool {
        if self.scope != Scope::Open {
            return false;
        }
        self.scope = Scope::Closed;
        trace!(resolved = self.resolved.len(), "binding scope closed");
        true
    }
}

impl<V: Variant> Drop for Binder<V> {
    fn drop(&mut self) {
        self.exit(Outcome::Aborted);
    }
}

impl<V: Variant> fmt::Debug for Binder<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("allowed", &self.allowed)
            .field("resolved", &self.resolved.len())
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}
