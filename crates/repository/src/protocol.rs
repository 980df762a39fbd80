//! Interfaces of the repository capabilities.

use crate::Result;
use uuid::Uuid;

/// Author lookups.
pub trait AuthorModule: Send + Sync {
    /// Display name of the author with the given external id.
    fn get_name(&self, external_id: i64) -> Result<String>;
}

/// Article publication.
pub trait ArticleModule: Send + Sync {
    /// Publish the article, returning whether anything was published.
    fn publish(&self, uuid: Uuid) -> Result<bool>;
}
