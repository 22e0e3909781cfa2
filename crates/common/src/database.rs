//! SQLite engine holding every collection.

use std::ops::Deref;
use std::path::Path;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};

use crate::error::{Context, Result};

const MAX_CONNECTIONS: u32 = 5;

/// Handle to the engine's data file.
///
/// The file is opened in WAL mode: a single writer at a time,
///  while readers proceed against a consistent snapshot.
#[derive(Clone, Debug)]
pub struct Database(SqlitePool);

impl Database {
    /// Open (or create) the engine data file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .context("open")?;

        tracing::info!(path = %path.display(), "opened database");
        let db = Self(pool);
        db.migrate().await?;
        Ok(db)
    }

    /// Create an in-memory engine.
    ///
    /// Each SQLite connection to `:memory:` is its own database, so the
    ///  pool is pinned to a single connection that is never recycled.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .context("open")?;

        let db = Self(pool);
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.0).await?;
        Ok(())
    }

    /// Start a read transaction. All queries issued through it observe
    ///  the same snapshot.
    pub(crate) async fn begin_read(&self) -> Result<Transaction<'static, Sqlite>> {
        self.0.begin().await.context("begin read")
    }

    /// Start a write transaction, taking the engine's writer lock up front.
    pub(crate) async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>> {
        self.0
            .begin_with("BEGIN IMMEDIATE")
            .await
            .context("begin write")
    }

    /// Check that the engine answers queries.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.0)
            .await
            .context("ping")?;
        Ok(())
    }

    pub async fn close(&self) {
        self.0.close().await;
    }
}

impl Deref for Database {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
