//! Server command line.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{ShardConfig, DEFAULT_BASE_DIR};

/// shardlite - route user records across SQLite shards
#[derive(Parser, Debug)]
#[command(name = "shardlite")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Run with one database or several shards
    #[arg(long, value_enum, default_value_t = Mode::Single, env = "SHARDLITE_MODE")]
    pub mode: Mode,

    /// Number of shards (sharded mode only)
    #[arg(long, default_value_t = 3, env = "SHARDLITE_SHARDS")]
    pub shards: usize,

    /// Directory holding the shard_<i>.db files
    #[arg(long, default_value = DEFAULT_BASE_DIR, env = "SHARDLITE_DB_DIR")]
    pub db_dir: PathBuf,

    /// Host address to bind the server to
    #[arg(long, short = 'H', default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = 8080, env = "PORT")]
    pub port: u16,
}

/// Storage layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// A single database file.
    Single,
    /// `--shards` database files.
    Sharded,
}

impl Cli {
    /// Shard count implied by the mode: single mode always uses one shard.
    pub fn num_shards(&self) -> usize {
        match self.mode {
            Mode::Single => 1,
            Mode::Sharded => self.shards,
        }
    }

    pub fn shard_config(&self) -> ShardConfig {
        ShardConfig::new(self.num_shards(), self.db_dir.clone())
    }
}
