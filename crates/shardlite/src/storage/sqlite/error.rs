//! SQLite error mapping.
//!
//! Maps `sqlx::Error` to `ShardError` from `shardlite_core::shard`. Lock
//! contention gets its own variant so callers can tell "try later" apart from
//! genuine failures; nothing here retries.

use shardlite_core::shard::ShardError;

/// `SQLITE_BUSY` primary result code.
const SQLITE_BUSY: i32 = 5;
/// `SQLITE_LOCKED` primary result code.
const SQLITE_LOCKED: i32 = 6;

/// True if an SQLite result code (primary or extended) reports lock
/// contention. Extended codes carry the primary code in the low byte.
fn is_busy_code(code: &str) -> bool {
    code.parse::<i32>()
        .map(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

/// Maps an sqlx error raised while serving a request.
///
/// # Error Mapping
///
/// - `SQLITE_BUSY` / `SQLITE_LOCKED` (any extended code) → `ShardError::Busy`
/// - pool acquire timeout → `ShardError::Busy`
/// - pool closed → `ShardError::Closed`
/// - all other errors → `ShardError::Query`
pub fn map_sqlx_error(err: sqlx::Error) -> ShardError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.code().is_some_and(|c| is_busy_code(&c)) => {
            ShardError::Busy(db_err.message().to_string())
        }
        sqlx::Error::PoolTimedOut => {
            ShardError::Busy("timed out waiting for a pooled connection".to_string())
        }
        sqlx::Error::PoolClosed => ShardError::Closed,
        _ => ShardError::Query(err.to_string()),
    }
}

/// Maps an sqlx error raised while opening the pool for `path`.
pub fn map_open_error(err: sqlx::Error, path: &str) -> ShardError {
    ShardError::Open {
        path: path.to_string(),
        message: err.to_string(),
    }
}
