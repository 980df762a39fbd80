//! SQLite capability backend.

use crate::{ArticleModule, AuthorModule, Error, Result};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed author and article tables.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a store at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS authors (
                external_id INTEGER PRIMARY KEY,
                name TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS articles (
                uuid TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                published_at TEXT
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert or rename an author.
    pub fn add_author(&self, external_id: i64, name: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO authors (external_id, name) VALUES (?1, ?2)
             ON CONFLICT(external_id) DO UPDATE SET name = excluded.name",
            params![external_id, name],
        )?;
        Ok(())
    }

    /// Insert an unpublished article.
    pub fn add_article(&self, uuid: Uuid, title: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO articles (uuid, title) VALUES (?1, ?2)",
            params![uuid.to_string(), title],
        )?;
        Ok(())
    }

    pub fn author_name(&self, external_id: i64) -> Result<String> {
        self.conn
            .query_row(
                "SELECT name FROM authors WHERE external_id = ?1",
                [external_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or_else(|| Error::NotFound(format!("author {external_id}")))
    }

    /// Mark an unpublished article as published now.
    ///
    /// Returns false when the article does not exist or was already published.
    pub fn publish(&self, uuid: Uuid) -> Result<bool> {
        let changed = self.conn.execute(
            "UPDATE articles SET published_at = ?1 WHERE uuid = ?2 AND published_at IS NULL",
            params![Utc::now().to_rfc3339(), uuid.to_string()],
        )?;
        Ok(changed > 0)
    }

    /// When the article was published, if it exists and was.
    pub fn published_at(&self, uuid: Uuid) -> Result<Option<DateTime<Utc>>> {
        let published: Option<Option<String>> = self
            .conn
            .query_row(
                "SELECT published_at FROM articles WHERE uuid = ?1",
                [uuid.to_string()],
                |row| row.get(0),
            )
            .optional()?;

        Ok(published
            .flatten()
            .and_then(|ts| ts.parse::<DateTime<Utc>>().ok()))
    }

    fn execute(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

/// One call's connection, held inside an open transaction.
///
/// Clones share the connection; the capabilities resolved during a call all
/// see the same transaction.
#[derive(Clone)]
pub struct SqliteScope {
    store: Arc<Mutex<SqliteStore>>,
}

impl SqliteScope {
    /// Open a connection and begin a transaction.
    ///
    /// The write lock is taken up front, so a concurrent scope waits in the
    /// busy handler here instead of failing when it first writes.
    pub fn begin(path: impl AsRef<Path>) -> Result<Self> {
        let store = SqliteStore::open(path)?;
        store.execute("BEGIN IMMEDIATE")?;
        Ok(Self {
            store: Arc::new(Mutex::new(store)),
        })
    }

    pub fn commit(&self) -> Result<()> {
        self.store().execute("COMMIT")
    }

    pub fn rollback(&self) -> Result<()> {
        self.store().execute("ROLLBACK")
    }

    fn store(&self) -> MutexGuard<'_, SqliteStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl AuthorModule for SqliteScope {
    fn get_name(&self, external_id: i64) -> Result<String> {
        self.store().author_name(external_id)
    }
}

impl ArticleModule for SqliteScope {
    fn publish(&self, uuid: Uuid) -> Result<bool> {
        self.store().publish(uuid)
    }
}
