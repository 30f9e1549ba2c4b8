use async_trait::async_trait;

use super::{Result, UserRecord};

/// A single shard's storage backend.
///
/// The manager owns one backend per shard and never shares a backend between
/// shards.
#[async_trait]
pub trait ShardBackend: Send + Sync {
    /// Inserts the record unless a record with the same id already exists.
    ///
    /// A duplicate id is not an error and does not overwrite: first write wins.
    async fn insert_if_absent(&self, record: &UserRecord) -> Result<()>;

    /// Looks up a record by id.
    async fn lookup(&self, id: i64) -> Result<Option<UserRecord>>;

    /// Releases the backend's resources.
    async fn close(&self) -> Result<()>;
}
