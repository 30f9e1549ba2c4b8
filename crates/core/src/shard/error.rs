use std::fmt;

use thiserror::Error;

/// Errors that can occur while opening, using or closing shards.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShardError {
    #[error("invalid shard count {0}: must be >= 1")]
    InvalidShardCount(usize),
    #[error("failed to create database directory {path}: {message}")]
    CreateDir { path: String, message: String },
    #[error("failed to open shard database {path}: {message}")]
    Open { path: String, message: String },
    #[error("failed to apply pragma {pragma}: {message}")]
    Pragma {
        pragma: &'static str,
        message: String,
    },
    #[error("failed to create schema: {0}")]
    Schema(String),
    #[error("database busy: {0}")]
    Busy(String),
    #[error("user not found: {id}")]
    NotFound { id: i64 },
    #[error("query failed: {0}")]
    Query(String),
    #[error("shard is closed")]
    Closed,
    #[error(transparent)]
    Close(CloseErrors),
}

impl ShardError {
    /// True for the expected "no such user" outcome of a lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ShardError::NotFound { .. })
    }
}

/// A single shard that failed to close.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShardFailure {
    pub shard: usize,
    pub error: ShardError,
}

/// Every close failure collected while shutting down a set of shards.
///
/// Never empty when returned inside [`ShardError::Close`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseErrors {
    failures: Vec<ShardFailure>,
}

impl CloseErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shard: usize, error: ShardError) {
        self.failures.push(ShardFailure { shard, error });
    }

    pub fn failures(&self) -> &[ShardFailure] {
        &self.failures
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns `Ok(())` when nothing failed, otherwise the combined error.
    pub fn into_result(self) -> Result<()> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ShardError::Close(self))
        }
    }
}

impl fmt::Display for CloseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to close {} shard(s)", self.failures.len())?;
        for (i, failure) in self.failures.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{sep}shard {}: {}", failure.shard, failure.error)?;
        }
        Ok(())
    }
}

impl std::error::Error for CloseErrors {}

/// Result type for shard operations.
pub type Result<T> = std::result::Result<T, ShardError>;
