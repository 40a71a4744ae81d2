use crate::errors::JwksError;
use crate::models::{KeyClass, SigningKey};
use secrecy::{ExposeSecret, SecretString};
use sqlx::SqlitePool;
use tracing::instrument;

/// Durable repository of signing keys.
///
/// Owns every `SigningKey` row. Cloning is cheap: clones share the same
/// connection pool, and each query checks a connection out for its own
/// duration only.
#[derive(Debug, Clone)]
pub struct KeyStore {
    pool: SqlitePool,
}

impl KeyStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Underlying pool, for connectivity probes and test fault injection.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create the `keys` table if absent and delete every row.
    ///
    /// Destructive; only meant for process start. AUTOINCREMENT keeps the
    /// id sequence, so ids handed out before a re-initialization are never
    /// reused.
    #[instrument(skip_all)]
    pub async fn initialize(&self) -> Result<(), JwksError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS keys (
                kid INTEGER PRIMARY KEY AUTOINCREMENT,
                key BLOB NOT NULL,
                exp INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| JwksError::Storage(format!("Failed to create keys table: {}", e)))?;

        sqlx::query("DELETE FROM keys")
            .execute(&self.pool)
            .await
            .map_err(|e| JwksError::Storage(format!("Failed to clear keys table: {}", e)))?;

        Ok(())
    }

    /// Persist a new signing key and return its store-assigned id.
    #[instrument(skip_all, fields(exp = expires_at))]
    pub async fn insert(&self, material: &SecretString, expires_at: i64) -> Result<i64, JwksError> {
        let result = sqlx::query(
            r#"
            INSERT INTO keys (key, exp)
            VALUES (?, ?)
            "#,
        )
        .bind(material.expose_secret().as_bytes())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| JwksError::Storage(format!("Failed to insert signing key: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    /// Find one key of the given class relative to `now`.
    ///
    /// Comparisons are strict, so a key with `exp == now` is in neither
    /// class. Ties resolve to the lowest id.
    pub async fn find_one(
        &self,
        class: KeyClass,
        now: i64,
    ) -> Result<Option<SigningKey>, JwksError> {
        let query = match class {
            KeyClass::Expired => {
                r#"
                SELECT kid, key, exp
                FROM keys
                WHERE exp < ?
                ORDER BY kid ASC
                LIMIT 1
                "#
            }
            KeyClass::Valid => {
                r#"
                SELECT kid, key, exp
                FROM keys
                WHERE exp > ?
                ORDER BY kid ASC
                LIMIT 1
                "#
            }
        };

        let key = sqlx::query_as::<_, SigningKey>(query)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                JwksError::Storage(format!("Failed to fetch {} key: {}", class.as_str(), e))
            })?;

        Ok(key)
    }

    /// Every key with `exp > now`, in insertion order.
    pub async fn find_all_valid(&self, now: i64) -> Result<Vec<SigningKey>, JwksError> {
        let keys = sqlx::query_as::<_, SigningKey>(
            r#"
            SELECT kid, key, exp
            FROM keys
            WHERE exp > ?
            ORDER BY kid ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| JwksError::Storage(format!("Failed to fetch valid keys: {}", e)))?;

        Ok(keys)
    }

    /// Total number of stored keys, regardless of class.
    pub async fn count(&self) -> Result<i64, JwksError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM keys")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| JwksError::Storage(format!("Failed to count keys: {}", e)))?;

        Ok(count.0)
    }

    /// Cheap connectivity check.
    pub async fn ping(&self) -> Result<(), JwksError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| JwksError::Storage(format!("Database unreachable: {}", e)))?;

        Ok(())
    }
}

/// Single-connection in-memory store for unit tests.
///
/// The database lives as long as its one connection, so the pool never
/// recycles it.
#[cfg(test)]
pub(crate) async fn test_store() -> KeyStore {
    use sqlx::sqlite::SqlitePoolOptions;

    #[allow(clippy::expect_used)]
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory SQLite should open");

    KeyStore::new(pool)
}
