//! Request metrics for the HTTP layer.
//!
//! The shard manager knows nothing about metrics. Handlers time each manager
//! call from the outside and report it to a [`RequestObserver`] injected
//! through the application state.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

/// Number of recent latencies kept per operation for percentiles.
const LATENCY_WINDOW_SIZE: usize = 1000;

/// Kind of manager call being observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Write,
    Read,
}

/// How a manager call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    NotFound,
    Error,
}

/// Receives one event per completed manager call.
pub trait RequestObserver: Send + Sync {
    fn record(&self, operation: Operation, elapsed: Duration, outcome: Outcome);

    /// Point-in-time view for the `/metrics` endpoint.
    fn snapshot(&self) -> MetricsSnapshot;
}

/// Counters and a rolling latency window for one operation.
#[derive(Debug, Default)]
struct OperationMetrics {
    ok: AtomicU64,
    not_found: AtomicU64,
    errors: AtomicU64,
    latencies_us: Mutex<VecDeque<u64>>,
}

impl OperationMetrics {
    fn record(&self, elapsed: Duration, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Ok => &self.ok,
            Outcome::NotFound => &self.not_found,
            Outcome::Error => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        let mut latencies = self.latencies_us.lock().unwrap_or_else(|e| e.into_inner());
        if latencies.len() >= LATENCY_WINDOW_SIZE {
            latencies.pop_front();
        }
        latencies.push_back(micros);
    }

    fn snapshot(&self) -> OperationSnapshot {
        let ok = self.ok.load(Ordering::Relaxed);
        let not_found = self.not_found.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);

        let mut sorted: Vec<u64> = self
            .latencies_us
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .copied()
            .collect();
        sorted.sort_unstable();

        let (avg, p50, p95, p99) = if sorted.is_empty() {
            (0, 0, 0, 0)
        } else {
            let len = sorted.len();
            let sum: u64 = sorted.iter().sum();
            (
                sum / len as u64,
                sorted[len * 50 / 100],
                sorted[len * 95 / 100],
                sorted[(len * 99 / 100).min(len - 1)],
            )
        };

        OperationSnapshot {
            count: ok + not_found + errors,
            ok,
            not_found,
            errors,
            avg_us: avg,
            p50_us: p50,
            p95_us: p95,
            p99_us: p99,
        }
    }
}

/// Default [`RequestObserver`]: lock-free counters plus bounded latency
/// windows (last 1000 calls per operation).
#[derive(Debug)]
pub struct LatencyMetrics {
    write: OperationMetrics,
    read: OperationMetrics,
    started_at: Instant,
}

impl LatencyMetrics {
    pub fn new() -> Self {
        Self {
            write: OperationMetrics::default(),
            read: OperationMetrics::default(),
            started_at: Instant::now(),
        }
    }

    fn operation(&self, operation: Operation) -> &OperationMetrics {
        match operation {
            Operation::Write => &self.write,
            Operation::Read => &self.read,
        }
    }
}

impl Default for LatencyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestObserver for LatencyMetrics {
    fn record(&self, operation: Operation, elapsed: Duration, outcome: Outcome) {
        self.operation(operation).record(elapsed, outcome);
    }

    fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs(),
            write: self.write.snapshot(),
            read: self.read.snapshot(),
        }
    }
}

/// Serializable view of all request metrics.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub write: OperationSnapshot,
    pub read: OperationSnapshot,
}

/// Serializable view of one operation's metrics. Latencies in microseconds.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct OperationSnapshot {
    pub count: u64,
    pub ok: u64,
    pub not_found: u64,
    pub errors: u64,
    pub avg_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
}
