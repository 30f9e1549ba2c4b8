//! shardlite_core - functional core for shardlite.
//!
//! Pure data and pure functions only: the user record, the shard router, the
//! error taxonomy and its HTTP mapping, and the `ShardBackend` trait that
//! concrete stores implement. Nothing in this crate touches the filesystem or
//! a database.

pub mod shard;
