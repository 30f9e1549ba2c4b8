use std::{path::PathBuf, time::Duration};

use shardlite_core::shard::{Result, ShardError};

/// Default directory holding the shard files.
pub const DEFAULT_BASE_DIR: &str = "temp";

/// Pool limits and pragmas applied to every shard database.
///
/// The defaults are tuned for write-heavy concurrent workloads and are the
/// values the server runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Maximum simultaneously open connections per shard.
    pub max_open_connections: u32,
    /// Connections kept open while idle; idle connections above this count
    /// are reaped after `idle_timeout`.
    pub max_idle_connections: u32,
    /// Connections older than this are retired.
    pub max_connection_lifetime: Duration,
    /// How long an idle connection above `max_idle_connections` may linger.
    pub idle_timeout: Duration,
    /// `PRAGMA busy_timeout`; also bounds how long a caller waits for a
    /// free pooled connection.
    pub busy_timeout: Duration,
    /// `PRAGMA wal_autocheckpoint`, in pages.
    pub wal_autocheckpoint: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_open_connections: 20,
            max_idle_connections: 10,
            max_connection_lifetime: Duration::from_secs(5 * 60),
            idle_timeout: Duration::from_secs(60),
            busy_timeout: Duration::from_millis(5000),
            wal_autocheckpoint: 1000,
        }
    }
}

/// Everything needed to open a [`ShardManager`](crate::manager::ShardManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardConfig {
    /// Number of shards. Must be >= 1 and must match the count the data
    /// directory was written with.
    pub num_shards: usize,
    /// Directory holding `shard_<i>.db` files. Created if absent.
    pub base_dir: PathBuf,
    /// Per-shard pool and pragma settings.
    pub store: StoreConfig,
}

impl ShardConfig {
    pub fn new(num_shards: usize, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            num_shards,
            base_dir: base_dir.into(),
            store: StoreConfig::default(),
        }
    }

    /// Replace the per-shard store settings.
    pub fn with_store(mut self, store: StoreConfig) -> Self {
        self.store = store;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_shards < 1 {
            return Err(ShardError::InvalidShardCount(self.num_shards));
        }
        Ok(())
    }
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self::new(1, DEFAULT_BASE_DIR)
    }
}
