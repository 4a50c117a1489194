//! SQLite-backed [`KvStore`].
//!
//! Records live in a single `key_values` table keyed by `key`. The table is
//! created on [`SqliteStore::open`] if it does not exist; there is no other
//! schema management.

use std::path::Path;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tracing::{debug, info};

use crate::error::KvError;
use crate::record::{Record, validate_key};
use crate::store::KvStore;

const DEFAULT_MAX_CONNECTIONS: u32 = 8;

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS key_values (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)
"#;

const UPSERT: &str = r#"
INSERT INTO key_values (key, value)
VALUES (?1, ?2)
ON CONFLICT(key) DO UPDATE SET value = excluded.value
"#;

const SELECT_BY_KEY: &str = "SELECT key, value FROM key_values WHERE key = ?1";

/// Pooled SQLite store. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if absent) the database file at `path` and ensure the
    /// `key_values` table exists.
    ///
    /// The parent directory is created when missing. WAL journaling is
    /// enabled so readers do not block the writer.
    ///
    /// # Errors
    ///
    /// [`KvError::CreateDir`] or [`KvError::Init`] when the location cannot
    /// be prepared. Callers should treat either as fatal.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, KvError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| KvError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let init_err = |source| KvError::Init {
            path: path.to_path_buf(),
            source,
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(DEFAULT_MAX_CONNECTIONS)
            .connect_with(options)
            .await
            .map_err(init_err)?;

        sqlx::query(CREATE_TABLE)
            .execute(&pool)
            .await
            .map_err(init_err)?;

        info!(path = %path.display(), "Key-value store ready");
        Ok(Self { pool })
    }

    /// Wait for in-flight queries and close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl KvStore for SqliteStore {
    async fn save(&self, key: &str, value: &str) -> Result<(), KvError> {
        validate_key(key)?;
        sqlx::query(UPSERT)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await?;
        debug!(key, "Saved value");
        Ok(())
    }

    async fn load(&self, key: &str) -> Result<Option<String>, KvError> {
        validate_key(key)?;
        let record: Option<Record> = sqlx::query_as(SELECT_BY_KEY)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        debug!(key, found = record.is_some(), "Loaded value");
        Ok(record.map(|r| r.value))
    }
}
