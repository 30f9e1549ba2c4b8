//! shardlite - route user records across N SQLite shards.
//!
//! Each shard is one SQLite file with its own connection pool. A
//! [`ShardManager`] picks the shard for a user id with a CRC-32 hash of the
//! id's decimal string, modulo the shard count, and an axum application
//! exposes insert/get over HTTP.
//!
//! ```ignore
//! use shardlite::{ShardConfig, ShardManager};
//!
//! let manager = ShardManager::open(&ShardConfig::new(3, "temp")).await?;
//! manager.insert_user(1, "u1", "p1").await?;
//! let user = manager.get_user(1).await?;
//! manager.close().await?;
//! ```

pub mod app;
pub mod cli;
pub mod config;
pub mod handlers;
pub mod manager;
pub mod metrics;
pub mod state;
pub mod storage;

pub use app::create_app;
pub use config::{ShardConfig, StoreConfig};
pub use manager::ShardManager;
pub use metrics::{LatencyMetrics, RequestObserver};
pub use state::AppState;
