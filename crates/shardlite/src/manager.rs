//! Shard manager: routes user records to a fixed set of shards.
//!
//! The manager owns one backend per shard and a routing strategy. Neither
//! changes after construction, so the manager can be shared behind an `Arc`
//! with no locking; each backend's connection pool is the only point of
//! concurrency control.
//!
//! Routing is static modulo hashing (see [`shardlite_core::shard::route`]).
//! Reopening a data directory with a different shard count sends most ids to
//! the wrong file; there is no resharding.

use std::{future::Future, path::Path};

use shardlite_core::shard::{
    shard_file_name, CloseErrors, Crc32Router, Result, ShardBackend, ShardError, ShardRouter,
    UserRecord,
};

use crate::config::ShardConfig;
use crate::storage::SqliteShardStore;

/// Routes inserts and lookups to one of N shard backends.
pub struct ShardManager<B: ShardBackend = SqliteShardStore> {
    shards: Vec<B>,
    router: Box<dyn ShardRouter>,
}

impl ShardManager<SqliteShardStore> {
    /// Opens `config.num_shards` SQLite shards under `config.base_dir`.
    ///
    /// Shard `i` lives in `base_dir/shard_<i>.db`. If any shard fails to open,
    /// every shard opened before it is closed and the error is returned.
    pub async fn open(config: &ShardConfig) -> Result<Self> {
        config.validate()?;

        let base_dir = config.base_dir.as_path();
        tokio::fs::create_dir_all(base_dir)
            .await
            .map_err(|e| ShardError::CreateDir {
                path: base_dir.display().to_string(),
                message: e.to_string(),
            })?;

        let manager = Self::open_with(config.num_shards, Box::new(Crc32Router), |index| {
            let path = base_dir.join(shard_file_name(index));
            SqliteShardStore::open(path, &config.store)
        })
        .await?;

        tracing::info!(
            num_shards = config.num_shards,
            base_dir = %base_dir.display(),
            "Shard manager ready"
        );

        Ok(manager)
    }

    /// Paths of the shard files, in shard order.
    pub fn shard_paths(&self) -> Vec<&Path> {
        self.shards.iter().map(SqliteShardStore::path).collect()
    }
}

impl<B: ShardBackend> ShardManager<B> {
    /// Opens `num_shards` backends in shard order with `open_shard`.
    ///
    /// If any open fails, every backend opened before it is closed and the
    /// error is returned; later shards are never attempted.
    pub async fn open_with<F, Fut>(
        num_shards: usize,
        router: Box<dyn ShardRouter>,
        mut open_shard: F,
    ) -> Result<Self>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<B>>,
    {
        let mut shards = Vec::with_capacity(num_shards);
        for index in 0..num_shards {
            match open_shard(index).await {
                Ok(shard) => shards.push(shard),
                Err(err) => {
                    tracing::error!(shard = index, error = %err, "Failed to open shard");
                    close_opened(&shards).await;
                    return Err(err);
                }
            }
        }

        Self::from_shards(shards, router)
    }

    /// Builds a manager over already-open backends.
    ///
    /// Shard `i` is `shards[i]`. Fails on an empty list; the list is fixed for
    /// the lifetime of the manager.
    pub fn from_shards(shards: Vec<B>, router: Box<dyn ShardRouter>) -> Result<Self> {
        if shards.is_empty() {
            return Err(ShardError::InvalidShardCount(0));
        }
        Ok(Self { shards, router })
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard that owns `id`.
    pub fn shard_for(&self, id: i64) -> usize {
        self.router.route(id, self.shards.len())
    }

    fn shard(&self, id: i64) -> (&B, usize) {
        let index = self.shard_for(id);
        tracing::debug!(id, shard = index, "Routed user");
        (&self.shards[index], index)
    }

    /// Inserts a user unless one with the same id already exists.
    ///
    /// A duplicate id is silently ignored: the first write wins.
    pub async fn insert_user(&self, id: i64, username: &str, payload: &str) -> Result<()> {
        let (shard, index) = self.shard(id);
        let record = UserRecord::new(id, username, payload);

        shard.insert_if_absent(&record).await.inspect_err(|err| {
            tracing::warn!(id, shard = index, error = %err, "InsertUser failed");
        })
    }

    /// Fetches a user by id.
    ///
    /// An unknown id yields [`ShardError::NotFound`].
    pub async fn get_user(&self, id: i64) -> Result<UserRecord> {
        let (shard, index) = self.shard(id);

        let result = match shard.lookup(id).await {
            Ok(Some(record)) => Ok(record),
            Ok(None) => Err(ShardError::NotFound { id }),
            Err(err) => Err(err),
        };

        if let Err(err) = &result {
            if err.is_not_found() {
                tracing::debug!(id, shard = index, "GetUser found nothing");
            } else {
                tracing::warn!(id, shard = index, error = %err, "GetUser failed");
            }
        }

        result
    }

    /// Closes every shard, even if some fail.
    ///
    /// All failures are returned together as [`ShardError::Close`].
    pub async fn close(&self) -> Result<()> {
        let mut errors = CloseErrors::new();
        for (index, shard) in self.shards.iter().enumerate() {
            if let Err(err) = shard.close().await {
                tracing::warn!(shard = index, error = %err, "Failed to close shard");
                errors.push(index, err);
            }
        }

        if errors.is_empty() {
            tracing::info!(num_shards = self.shards.len(), "Closed all shards");
        }

        errors.into_result()
    }
}

/// Best-effort cleanup of shards opened before a construction failure.
async fn close_opened<B: ShardBackend>(shards: &[B]) {
    for (index, shard) in shards.iter().enumerate() {
        if let Err(err) = shard.close().await {
            tracing::warn!(shard = index, error = %err, "Failed to close shard during cleanup");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    };

    use async_trait::async_trait;
    use shardlite_core::shard::route;

    use super::*;

    /// In-memory backend that can be told to fail on close.
    #[derive(Default)]
    struct MemoryShard {
        rows: Mutex<HashMap<i64, UserRecord>>,
        fail_close: bool,
        closed: Arc<AtomicBool>,
    }

    impl MemoryShard {
        fn failing_close() -> Self {
            Self {
                fail_close: true,
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ShardBackend for MemoryShard {
        async fn insert_if_absent(&self, record: &UserRecord) -> Result<()> {
            self.rows
                .lock()
                .unwrap()
                .entry(record.id)
                .or_insert_with(|| record.clone());
            Ok(())
        }

        async fn lookup(&self, id: i64) -> Result<Option<UserRecord>> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn close(&self) -> Result<()> {
            self.closed.store(true, Ordering::SeqCst);
            if self.fail_close {
                Err(ShardError::Query("disk I/O error".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn memory_manager(num_shards: usize) -> ShardManager<MemoryShard> {
        let shards = (0..num_shards).map(|_| MemoryShard::default()).collect();
        ShardManager::from_shards(shards, Box::new(Crc32Router)).unwrap()
    }

    #[test]
    fn test_from_shards_rejects_empty() {
        let result = ShardManager::<MemoryShard>::from_shards(Vec::new(), Box::new(Crc32Router));
        assert!(matches!(result, Err(ShardError::InvalidShardCount(0))));
    }

    #[test]
    fn test_shard_for_uses_router() {
        let manager = memory_manager(4);
        for id in 0..100 {
            assert_eq!(manager.shard_for(id), route(id, 4));
        }
    }

    #[tokio::test]
    async fn test_insert_lands_on_routed_shard() {
        let manager = memory_manager(3);

        manager.insert_user(10, "u10", "p10").await.unwrap();

        let owner = manager.shard_for(10);
        for (index, shard) in manager.shards.iter().enumerate() {
            let found = shard.rows.lock().unwrap().contains_key(&10);
            assert_eq!(found, index == owner);
        }
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let manager = memory_manager(2);

        assert_eq!(
            manager.get_user(5).await,
            Err(ShardError::NotFound { id: 5 })
        );
    }

    #[tokio::test]
    async fn test_close_aggregates_every_failure() {
        let shards = vec![
            MemoryShard::failing_close(),
            MemoryShard::default(),
            MemoryShard::failing_close(),
        ];
        let closed: Vec<_> = shards.iter().map(|s| s.closed.clone()).collect();
        let manager = ShardManager::from_shards(shards, Box::new(Crc32Router)).unwrap();

        let err = manager.close().await.unwrap_err();

        assert!(closed.iter().all(|c| c.load(Ordering::SeqCst)));
        match &err {
            ShardError::Close(errors) => {
                let failed: Vec<usize> = errors.failures().iter().map(|f| f.shard).collect();
                assert_eq!(failed, vec![0, 2]);
            }
            other => panic!("Expected Close error, got {other:?}"),
        }
        let message = err.to_string();
        assert!(message.contains("shard 0"));
        assert!(message.contains("shard 2"));
        assert!(!message.contains("shard 1"));
    }

    #[tokio::test]
    async fn test_close_all_ok() {
        let manager = memory_manager(3);
        assert_eq!(manager.close().await, Ok(()));
    }

    #[tokio::test]
    async fn test_open_rejects_zero_shards() {
        let dir = tempfile::tempdir().unwrap();

        let result = ShardManager::open(&ShardConfig::new(0, dir.path())).await;

        assert!(matches!(result, Err(ShardError::InvalidShardCount(0))));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_open_creates_base_dir_and_files() {
        let dir = tempfile::tempdir().unwrap();
        let base_dir = dir.path().join("nested").join("data");

        let manager = ShardManager::open(&ShardConfig::new(3, &base_dir))
            .await
            .unwrap();

        assert_eq!(manager.num_shards(), 3);
        for index in 0..3 {
            assert!(base_dir.join(format!("shard_{index}.db")).exists());
        }
        assert_eq!(manager.shard_paths()[2], base_dir.join("shard_2.db"));

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_open_fails_when_base_dir_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, b"x").unwrap();

        let result = ShardManager::open(&ShardConfig::new(2, &file)).await;

        assert!(matches!(result, Err(ShardError::CreateDir { .. })));
    }

    #[tokio::test]
    async fn test_open_with_closes_opened_shards_on_failure() {
        let mut attempts = Vec::new();
        let mut closed_flags = Vec::new();

        let result = ShardManager::open_with(4, Box::new(Crc32Router), |index| {
            attempts.push(index);
            let shard = MemoryShard::default();
            closed_flags.push(shard.closed.clone());
            async move {
                if index == 2 {
                    Err(ShardError::Open {
                        path: "shard_2.db".to_string(),
                        message: "unable to open database file".to_string(),
                    })
                } else {
                    Ok(shard)
                }
            }
        })
        .await;

        assert!(matches!(result, Err(ShardError::Open { .. })));
        assert_eq!(attempts, vec![0, 1, 2]);
        assert!(closed_flags[0].load(Ordering::SeqCst));
        assert!(closed_flags[1].load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_open_with_keeps_shards_open_on_success() {
        let mut closed_flags = Vec::new();

        let manager = ShardManager::open_with(3, Box::new(Crc32Router), |_| {
            let shard = MemoryShard::default();
            closed_flags.push(shard.closed.clone());
            async move { Ok(shard) }
        })
        .await
        .unwrap();

        assert_eq!(manager.num_shards(), 3);
        assert!(closed_flags.iter().all(|c| !c.load(Ordering::SeqCst)));

        manager.close().await.unwrap();
        assert!(closed_flags.iter().all(|c| c.load(Ordering::SeqCst)));
    }

    #[tokio::test]
    async fn test_open_stops_at_first_unopenable_shard() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where shard_1.db should be makes the second open fail.
        std::fs::create_dir(dir.path().join("shard_1.db")).unwrap();

        let result = ShardManager::open(&ShardConfig::new(3, dir.path())).await;

        assert!(matches!(result, Err(ShardError::Open { .. })));
        assert!(dir.path().join("shard_0.db").exists());
        assert!(!dir.path().join("shard_2.db").exists());
    }

    #[tokio::test]
    async fn test_three_shard_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ShardManager::open(&ShardConfig::new(3, dir.path()))
            .await
            .unwrap();

        for id in 1..=10 {
            manager
                .insert_user(id, &format!("u{id}"), &format!("p{id}"))
                .await
                .unwrap();
        }

        for id in 1..=10 {
            let user = manager.get_user(id).await.unwrap();
            assert_eq!(user.username, format!("u{id}"));
            assert_eq!(user.payload, format!("p{id}"));
        }
        assert_eq!(
            manager.get_user(11).await,
            Err(ShardError::NotFound { id: 11 })
        );

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_insert_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ShardManager::open(&ShardConfig::new(3, dir.path()))
            .await
            .unwrap();

        manager.insert_user(42, "u1", "p1").await.unwrap();
        manager.insert_user(42, "u2", "p2").await.unwrap();

        let user = manager.get_user(42).await.unwrap();
        assert_eq!((user.username.as_str(), user.payload.as_str()), ("u1", "p1"));

        manager.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_single_shard_holds_everything() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ShardManager::open(&ShardConfig::new(1, dir.path()))
            .await
            .unwrap();

        for id in 0..1000 {
            manager
                .insert_user(id, &format!("u{id}"), "payload")
                .await
                .unwrap();
        }
        for id in 0..1000 {
            assert_eq!(manager.get_user(id).await.unwrap().username, format!("u{id}"));
        }
        manager.close().await.unwrap();

        let db_files: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".db"))
            .collect();
        assert_eq!(db_files, vec!["shard_0.db".to_string()]);

        let pool = sqlx::SqlitePool::connect_with(
            sqlx::sqlite::SqliteConnectOptions::new().filename(dir.path().join("shard_0.db")),
        )
        .await
        .unwrap();
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1000);
        pool.close().await;
    }

    #[tokio::test]
    async fn test_rows_spread_over_shard_files() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ShardManager::open(&ShardConfig::new(3, dir.path()))
            .await
            .unwrap();

        for id in 1..=300 {
            manager.insert_user(id, "u", "p").await.unwrap();
        }
        manager.close().await.unwrap();

        for index in 0..3 {
            let pool = sqlx::SqlitePool::connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .filename(dir.path().join(format!("shard_{index}.db"))),
            )
            .await
            .unwrap();
            let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM users")
                .fetch_all(&pool)
                .await
                .unwrap();
            pool.close().await;

            assert!(!ids.is_empty());
            assert!(ids.iter().all(|&id| route(id, 3) == index));
        }
    }

    #[tokio::test]
    async fn test_second_close_reports_every_shard() {
        let dir = tempfile::tempdir().unwrap();
        let manager = ShardManager::open(&ShardConfig::new(2, dir.path()))
            .await
            .unwrap();

        manager.close().await.unwrap();

        match manager.close().await {
            Err(ShardError::Close(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("Expected Close error, got {other:?}"),
        }
    }
}
