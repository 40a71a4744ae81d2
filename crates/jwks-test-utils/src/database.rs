//! SQLite pools for tests
//!
//! - `memory_pool` - private in-memory database, one connection
//! - `FileDatabase` - database file in a temp directory, for multi-connection
//!   and reopen (restart) scenarios

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Open a private in-memory database.
///
/// An in-memory SQLite database lives only as long as its connection, so
/// the pool is pinned to exactly one connection that is never recycled.
pub async fn memory_pool() -> Result<SqlitePool, anyhow::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open in-memory database: {}", e))?;

    Ok(pool)
}

/// A database file that is deleted when this value is dropped.
pub struct FileDatabase {
    dir: TempDir,
    path: PathBuf,
}

impl FileDatabase {
    /// Create an empty temp directory for the database file.
    pub fn new() -> Result<Self, anyhow::Error> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("keys.db");
        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a new pool on the file, creating it if missing.
    ///
    /// Each call is an independent pool, the way a restarted process would
    /// see the same file.
    pub async fn connect(&self, max_connections: u32) -> Result<SqlitePool, anyhow::Error> {
        let options = SqliteConnectOptions::new()
            .filename(&self.path)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                anyhow::anyhow!(
                    "Failed to open database in {}: {}",
                    self.dir.path().display(),
                    e
                )
            })?;

        Ok(pool)
    }
}
