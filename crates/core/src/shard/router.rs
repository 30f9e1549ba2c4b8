//! Key-to-shard routing.
//!
//! Routing is static modulo hashing: `crc32(decimal(key)) % num_shards`.
//! Changing the shard count remaps nearly every key, and nothing migrates
//! existing rows, so a data directory must always be reopened with the shard
//! count it was written with.

/// Strategy that maps a record key to a shard index.
///
/// Implementations must be pure: the same key and shard count always yield
/// the same index in `[0, num_shards)`.
pub trait ShardRouter: Send + Sync {
    fn route(&self, key: i64, num_shards: usize) -> usize;
}

/// CRC-32 (IEEE) over the key's base-10 string, modulo the shard count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Crc32Router;

impl ShardRouter for Crc32Router {
    fn route(&self, key: i64, num_shards: usize) -> usize {
        route(key, num_shards)
    }
}

/// Maps `key` to a shard index in `[0, num_shards)`.
///
/// A single shard short-circuits to `0` without hashing, so single-shard mode
/// behaves exactly like an unsharded database.
///
/// # Panics
/// Panics if `num_shards` is zero.
///
/// # Examples
///
/// ```
/// use shardlite_core::shard::route;
///
/// assert_eq!(route(12345, 1), 0);
/// assert_eq!(route(12345, 3), route(12345, 3));
/// ```
pub fn route(key: i64, num_shards: usize) -> usize {
    assert!(num_shards > 0, "num_shards must be >= 1");
    if num_shards == 1 {
        return 0;
    }
    let checksum = crc32fast::hash(key.to_string().as_bytes());
    (u64::from(checksum) % num_shards as u64) as usize
}
