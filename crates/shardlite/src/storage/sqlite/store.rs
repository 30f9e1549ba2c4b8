//! SQLite shard store.
//!
//! Implements `ShardBackend` from `shardlite_core::shard` on top of one
//! `sqlx::SqlitePool` per database file.

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};

use shardlite_core::shard::{Result, ShardBackend, ShardError, UserRecord};

use super::error::{map_open_error, map_sqlx_error};
use super::schema;
use crate::config::StoreConfig;

/// One shard: a single SQLite file behind its own connection pool.
///
/// Every pooled connection runs with WAL journaling, a busy timeout,
/// `synchronous = NORMAL` and the configured WAL autocheckpoint threshold.
pub struct SqliteShardStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteShardStore {
    /// Opens (creating if needed) the database at `path`.
    ///
    /// The pool is closed again if the journal mode check or the schema
    /// bootstrap fails, so a failed open leaves nothing running.
    ///
    /// sqlx applies `busy_timeout` when the handle is created, before the
    /// `journal_mode`, `synchronous` and `wal_autocheckpoint` pragmas run, so
    /// the WAL switch itself already waits on a locked file. sqlx has no
    /// max-idle cap: `max_idle_connections` becomes the pool's minimum size
    /// and `idle_timeout` reaps connections above it.
    pub async fn open(path: impl AsRef<Path>, config: &StoreConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let path_str = path.display().to_string();

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(config.busy_timeout)
            .synchronous(SqliteSynchronous::Normal)
            .pragma(
                "wal_autocheckpoint",
                Cow::Owned(config.wal_autocheckpoint.to_string()),
            );

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_open_connections)
            .min_connections(config.max_idle_connections.min(config.max_open_connections))
            .max_lifetime(config.max_connection_lifetime)
            .idle_timeout(config.idle_timeout)
            .acquire_timeout(config.busy_timeout)
            .connect_with(options)
            .await
            .map_err(|e| map_open_error(e, &path_str))?;

        let store = Self { pool, path };

        if let Err(err) = store.bootstrap().await {
            store.pool.close().await;
            tracing::warn!(path = %path_str, error = %err, "Shard bootstrap failed");
            return Err(err);
        }

        tracing::info!(
            path = %path_str,
            max_open = config.max_open_connections,
            max_idle = config.max_idle_connections,
            "Opened shard"
        );

        Ok(store)
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Checks the journal mode took effect and creates the schema.
    async fn bootstrap(&self) -> Result<()> {
        let mode = sqlx::query_scalar::<_, String>(schema::SELECT_JOURNAL_MODE)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ShardError::Pragma {
                pragma: "journal_mode",
                message: e.to_string(),
            })?;

        if !mode.eq_ignore_ascii_case("wal") {
            return Err(ShardError::Pragma {
                pragma: "journal_mode",
                message: format!("expected wal, database reports {mode}"),
            });
        }

        sqlx::query(schema::CREATE_TABLES)
            .execute(&self.pool)
            .await
            .map_err(|e| ShardError::Schema(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl ShardBackend for SqliteShardStore {
    async fn insert_if_absent(&self, record: &UserRecord) -> Result<()> {
        sqlx::query(schema::INSERT_USER_IF_ABSENT)
            .bind(record.id)
            .bind(&record.username)
            .bind(&record.payload)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn lookup(&self, id: i64) -> Result<Option<UserRecord>> {
        let row =
            sqlx::query_as::<_, (Option<String>, Option<String>)>(schema::SELECT_USER_BY_ID)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        Ok(row.map(|(username, payload)| UserRecord {
            id,
            username: username.unwrap_or_default(),
            payload: payload.unwrap_or_default(),
        }))
    }

    async fn close(&self) -> Result<()> {
        if self.pool.is_closed() {
            return Err(ShardError::Closed);
        }

        // The pool is closed even if the checkpoint fails.
        let checkpoint = sqlx::query(schema::CHECKPOINT_TRUNCATE)
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(map_sqlx_error);

        self.pool.close().await;

        match &checkpoint {
            Ok(()) => tracing::info!(path = %self.path.display(), "Closed shard"),
            Err(err) => tracing::warn!(
                path = %self.path.display(),
                error = %err,
                "Shard checkpoint failed on close"
            ),
        }

        checkpoint
    }
}
