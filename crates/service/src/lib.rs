//! Service functions bound to the repository.
//!
//! Each function states the repository capabilities it uses through its
//! `bind_*` constructor; the returned wrapper hides the binder argument.
//!
//! ```
//! use repository::{Backends, MemoryStore};
//!
//! let backends = Backends::new(MemoryStore::new());
//! let publish = service::bind_publish_article(&backends.module())?;
//! assert!(publish.call(None)?);
//! # Ok::<(), service::Error>(())
//! ```

mod error;

pub use error::{Error, Result};

use binder::{Binder, Bound, BoundAsync, Module};
use futures::FutureExt;
use futures::future::BoxFuture;
use repository::{ModuleName, Repository, RepositoryExt};
use tracing::{debug, info};
use uuid::Uuid;

/// Publish `uuid`, or a freshly generated one when none is given.
pub fn publish_article_if_exists_or_random(
    bind: &mut Binder<Repository>,
    uuid: Option<Uuid>,
) -> Result<bool> {
    let uuid = uuid.unwrap_or_else(Uuid::new_v4);
    debug!(%uuid, "publishing article");
    Ok(bind.article()?.publish(uuid)?)
}

/// Publish an article on behalf of an author, logging who is credited.
pub fn publish_credited(
    bind: &mut Binder<Repository>,
    (uuid, author_id): (Option<Uuid>, i64),
) -> Result<bool> {
    let author = bind.author()?.get_name(author_id)?;
    let uuid = uuid.unwrap_or_else(Uuid::new_v4);
    info!(%author, %uuid, "publishing credited article");
    Ok(bind.article()?.publish(uuid)?)
}

/// Reassign an article to another author.
///
/// Declared with the author capability only, so the article lookup is
/// always rejected.
pub fn reassign(bind: &mut Binder<Repository>, args: (i64, String)) -> BoxFuture<'_, Result<f64>> {
    reassign_article(bind, args).boxed()
}

async fn reassign_article(
    bind: &mut Binder<Repository>,
    (author_id, title): (i64, String),
) -> Result<f64> {
    debug!(author_id, %title, "reassigning article");
    let published = bind.article()?.publish(Uuid::new_v4())?;
    let author = bind.author()?.get_name(author_id)?;
    info!(%author, %title, "article reassigned");
    Ok(if published { 1.0 } else { 0.0 })
}

/// Bind [`publish_article_if_exists_or_random`] with access to articles.
pub fn bind_publish_article(
    module: &Module<Repository>,
) -> binder::Result<
    Bound<
        Repository,
        impl Fn(&mut Binder<Repository>, Option<Uuid>) -> Result<bool> + Send + Sync + use<>,
        Option<Uuid>,
    >,
> {
    module
        .allow([ModuleName::Article])?
        .wrap(publish_article_if_exists_or_random)
}

/// Bind [`publish_credited`] with access to authors and articles.
pub fn bind_publish_credited(
    module: &Module<Repository>,
) -> binder::Result<
    Bound<
        Repository,
        impl Fn(&mut Binder<Repository>, (Option<Uuid>, i64)) -> Result<bool> + Send + Sync + use<>,
        (Option<Uuid>, i64),
    >,
> {
    module
        .allow([ModuleName::Article, ModuleName::Author])?
        .wrap(publish_credited)
}

/// Bind [`reassign`] with access to authors only.
pub fn bind_reassign(
    module: &Module<Repository>,
) -> binder::Result<
    BoundAsync<
        Repository,
        impl for<'b> Fn(&'b mut Binder<Repository>, (i64, String)) -> BoxFuture<'b, Result<f64>>
        + Send
        + Sync
        + use<>,
        (i64, String),
    >,
> {
    module.allow([ModuleName::Author])?.wrap_async(reassign)
}
