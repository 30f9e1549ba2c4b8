//! shardlite_loadgen - HTTP load generator for the shardlite server.

pub mod cli;
pub mod client;
pub mod error;
pub mod report;
pub mod runner;

pub use client::LoadClient;
pub use error::{LoadgenError, Result};
pub use report::Summary;
pub use runner::{run, LoadConfig};
