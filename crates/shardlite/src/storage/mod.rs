//! Storage backend implementations.
//!
//! Concrete implementations of `shardlite_core::shard::ShardBackend`.

pub mod sqlite;

pub use sqlite::SqliteShardStore;
