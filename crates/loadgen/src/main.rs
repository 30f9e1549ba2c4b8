//! shardlite-loadgen CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shardlite_loadgen::{cli::Cli, run, LoadClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shardlite_loadgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = cli.load_config()?;
    let client = LoadClient::new(&cli.target, config.concurrency)?;

    let summary = run(client, &config).await?;

    tracing::info!(
        ops = summary.ops(),
        writes = summary.writes,
        reads = summary.reads,
        errors = summary.errors,
        "Load run finished"
    );
    println!("{summary}");

    Ok(())
}
