//! Scoped, least-privilege capability binding.
//!
//! A function declares the capabilities it needs; a bound wrapper injects a
//! [`Binder`] that resolves exactly those capabilities for the duration of
//! one call, and nothing else.
//!
//! # Overview
//!
//! - **[`Variant`]**: a concrete binder. It fixes the closed set of capability
//!   names and may hook scope setup and teardown (for example to run every
//!   call inside a transaction).
//! - **[`Capability`]**: one capability a variant can resolve, with the
//!   interface handle it hands out.
//! - **[`Module`]**: builds a fresh variant per call and hands out
//!   [`Declaration`]s, one per function, each carrying an [`AllowList`].
//! - **[`Bound`] / [`BoundAsync`]**: the wrapped function. Calling it opens a
//!   scope, injects the binder, and closes the scope on every exit path.
//!
//! Names outside a declaration's allow-list fail at the point of access with
//! [`Error::CapabilityNotGranted`], even when the variant could resolve them.
//!
//! # Example
//!
//! ```
//! use binder::{Binder, Capability, Module, Result, Variant};
//! use std::fmt;
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Name {
//!     Greeter,
//!     Clock,
//! }
//!
//! impl fmt::Display for Name {
//!     fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
//!         f.write_str(match self {
//!             Name::Greeter => "greeter",
//!             Name::Clock => "clock",
//!         })
//!     }
//! }
//!
//! trait Greet: Send + Sync {
//!     fn greet(&self, who: &str) -> String;
//! }
//!
//! struct English;
//!
//! impl Greet for English {
//!     fn greet(&self, who: &str) -> String {
//!         format!("hello, {who}")
//!     }
//! }
//!
//! #[derive(Default)]
//! struct App;
//!
//! impl Variant for App {
//!     type Name = Name;
//! }
//!
//! struct Greeter;
//!
//! impl Capability<App> for Greeter {
//!     const NAME: Name = Name::Greeter;
//!     type Output = Arc<dyn Greet>;
//!
//!     fn resolve(_: &mut App) -> Result<Self::Output> {
//!         Ok(Arc::new(English))
//!     }
//! }
//!
//! fn welcome(bind: &mut Binder<App>, who: String) -> Result<String> {
//!     Ok(bind.get::<Greeter>()?.greet(&who))
//! }
//!
//! let module = Module::<App>::default();
//!
//! let welcome = module.allow([Name::Greeter])?.wrap(welcome)?;
//! assert_eq!(welcome.call("world".to_string())?, "hello, world");
//!
//! // The same code granted only the clock fails when it reaches for the greeter.
//! let sneaky = module
//!     .allow([Name::Clock])?
//!     .wrap(|bind: &mut Binder<App>, who: String| -> Result<String> {
//!         Ok(bind.get::<Greeter>()?.greet(&who))
//!     })?;
//! assert!(sneaky.call("world".to_string()).is_err());
//! # Ok::<(), binder::Error>(())
//! ```

mod binder;
mod bound;
mod capability;
mod error;
mod module;

pub use binder::{Binder, Outcome, Variant};
pub use bound::{Bound, BoundAsync};
pub use capability::{AllowList, Capability, CapabilityName};
pub use error::{Error, Result};
pub use module::{Declaration, Module};
