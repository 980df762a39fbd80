//! In-process capability backend.

use crate::{ArticleModule, AuthorModule, Error, Result};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use uuid::Uuid;

/// Shared in-memory store backing both capabilities.
///
/// Clones share state. Publishing accepts any uuid and records it.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    authors: Arc<RwLock<HashMap<i64, String>>>,
    published: Arc<Mutex<Vec<Uuid>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an author name under an external id.
    pub fn add_author(&self, external_id: i64, name: impl Into<String>) {
        self.authors
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(external_id, name.into());
    }

    /// Uuids published so far, oldest first.
    pub fn published(&self) -> Vec<Uuid> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AuthorModule for MemoryStore {
    fn get_name(&self, external_id: i64) -> Result<String> {
        self.authors
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&external_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("author {external_id}")))
    }
}

impl ArticleModule for MemoryStore {
    fn publish(&self, uuid: Uuid) -> Result<bool> {
        self.published
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(uuid);
        Ok(true)
    }
}
