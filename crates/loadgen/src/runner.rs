//! Worker pool driving a load run.
//!
//! `concurrency` tasks pull operation numbers from one shared counter until
//! `ops` have been issued. Every operation is timed, including failed ones.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

use reqwest::StatusCode;
use tokio::task::JoinSet;

use crate::{client::LoadClient, error::Result, report::Summary};

/// Parameters of one load run.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadConfig {
    pub ops: u64,
    pub concurrency: usize,
    /// Probability that an operation is a write.
    pub write_ratio: f64,
    pub payload_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            ops: 1000,
            concurrency: 10,
            write_ratio: 0.5,
            payload_size: 512,
        }
    }
}

/// A single request against the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Write(i64),
    Read(i64),
}

impl Op {
    /// Draw a write with probability `write_ratio`, otherwise a read, for a
    /// random id in `1..=ops`.
    pub fn pick(write_ratio: f64, ops: u64) -> Self {
        let id = random_user_id(ops);
        if rand::random::<f64>() < write_ratio {
            Op::Write(id)
        } else {
            Op::Read(id)
        }
    }

    /// Writes succeed on 200 only; a read of a missing user is still a
    /// successful read.
    pub fn succeeded(&self, status: StatusCode) -> bool {
        match self {
            Op::Write(_) => status == StatusCode::OK,
            Op::Read(_) => status == StatusCode::OK || status == StatusCode::NOT_FOUND,
        }
    }
}

fn random_user_id(ops: u64) -> i64 {
    if ops == 0 {
        return 1;
    }
    rand::random_range(1..=ops) as i64
}

#[derive(Debug, Default)]
struct Counters {
    next: AtomicU64,
    writes: AtomicU64,
    reads: AtomicU64,
    errors: AtomicU64,
    latency_nanos: AtomicU64,
}

/// Run `config.ops` operations against `client` and summarize them.
pub async fn run(client: LoadClient, config: &LoadConfig) -> Result<Summary> {
    let counters = Arc::new(Counters::default());
    let payload: Arc<str> = "x".repeat(config.payload_size).into();

    tracing::info!(
        target_url = client.base_url(),
        ops = config.ops,
        concurrency = config.concurrency,
        write_ratio = config.write_ratio,
        payload_size = config.payload_size,
        "Starting load run"
    );

    let started = Instant::now();
    let mut workers = JoinSet::new();
    for _ in 0..config.concurrency {
        let client = client.clone();
        let counters = counters.clone();
        let payload = payload.clone();
        let (ops, write_ratio) = (config.ops, config.write_ratio);

        workers.spawn(async move {
            while counters.next.fetch_add(1, Ordering::Relaxed) < ops {
                let op = Op::pick(write_ratio, ops);
                let op_started = Instant::now();
                let result = match op {
                    Op::Write(id) => client.insert(id, &format!("u{id}"), &payload).await,
                    Op::Read(id) => client.get(id).await,
                };
                counters
                    .latency_nanos
                    .fetch_add(op_started.elapsed().as_nanos() as u64, Ordering::Relaxed);

                match result {
                    Ok(status) if op.succeeded(status) => {
                        let counter = match op {
                            Op::Write(_) => &counters.writes,
                            Op::Read(_) => &counters.reads,
                        };
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(status) => {
                        tracing::debug!(?op, %status, "Unexpected status");
                        counters.errors.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(err) => {
                        tracing::debug!(?op, error = %err, "Request failed");
                        counters.errors.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
        });
    }

    while let Some(joined) = workers.join_next().await {
        joined?;
    }

    Ok(Summary {
        elapsed: started.elapsed(),
        writes: counters.writes.load(Ordering::Relaxed),
        reads: counters.reads.load(Ordering::Relaxed),
        errors: counters.errors.load(Ordering::Relaxed),
        total_latency: Duration::from_nanos(counters.latency_nanos.load(Ordering::Relaxed)),
    })
}
