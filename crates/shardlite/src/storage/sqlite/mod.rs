//! SQLite storage backend.
//!
//! Each shard is a single SQLite file accessed through an `sqlx::SqlitePool`.

mod error;
mod schema;
mod store;

pub use store::SqliteShardStore;
