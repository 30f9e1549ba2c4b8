//! CLI definition.

use clap::Parser;

use crate::{
    error::{LoadgenError, Result},
    runner::LoadConfig,
};

/// HTTP load generator for the shardlite server.
#[derive(Debug, Parser)]
#[command(name = "shardlite-loadgen")]
#[command(about = "HTTP load generator for the shardlite server", long_about = None)]
pub struct Cli {
    /// Server base URL.
    #[arg(long, env = "SHARDLITE_URL", default_value = "http://localhost:8080")]
    pub target: String,

    /// Total number of operations to issue.
    #[arg(long, default_value_t = 1000)]
    pub ops: u64,

    /// Number of concurrent workers.
    #[arg(long, default_value_t = 10)]
    pub concurrency: usize,

    /// Fraction of operations that are writes, in [0, 1].
    #[arg(long, default_value_t = 0.5)]
    pub write_ratio: f64,

    /// Size in bytes of the payload sent with every write.
    #[arg(long, default_value_t = 512)]
    pub payload_size: usize,
}

impl Cli {
    /// Validate the arguments and turn them into a run configuration.
    pub fn load_config(&self) -> Result<LoadConfig> {
        if self.concurrency == 0 {
            return Err(LoadgenError::InvalidInput(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.write_ratio) {
            return Err(LoadgenError::InvalidInput(format!(
                "write ratio must be within [0, 1], got {}",
                self.write_ratio
            )));
        }

        Ok(LoadConfig {
            ops: self.ops,
            concurrency: self.concurrency,
            write_ratio: self.write_ratio,
            payload_size: self.payload_size,
        })
    }
}
