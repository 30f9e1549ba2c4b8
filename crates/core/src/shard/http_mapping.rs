//! Pure functions for mapping shard errors to HTTP status codes.
//!
//! Malformed input never reaches the shards (ids are parsed by the HTTP layer
//! first), so the only non-500 outcome here is "not found".

use super::ShardError;

/// Maps a [`ShardError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - everything else -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use shardlite_core::shard::{shard_error_to_status_code, ShardError};
///
/// assert_eq!(shard_error_to_status_code(&ShardError::NotFound { id: 7 }), 404);
/// assert_eq!(shard_error_to_status_code(&ShardError::Busy("locked".into())), 500);
/// ```
pub fn shard_error_to_status_code(error: &ShardError) -> u16 {
    match error {
        ShardError::NotFound { .. } => 404,
        ShardError::InvalidShardCount(_)
        | ShardError::CreateDir { .. }
        | ShardError::Open { .. }
        | ShardError::Pragma { .. }
        | ShardError::Schema(_)
        | ShardError::Busy(_)
        | ShardError::Query(_)
        | ShardError::Closed
        | ShardError::Close(_) => 500,
    }
}
