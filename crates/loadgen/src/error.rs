//! Load generator error types.

use thiserror::Error;

/// Result type alias for the load generator.
pub type Result<T> = std::result::Result<T, LoadgenError>;

/// Errors that can occur while setting up or running a load test.
#[derive(Error, Debug)]
pub enum LoadgenError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}
