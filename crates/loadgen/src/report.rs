//! Run summary.

use std::{fmt, time::Duration};

/// Aggregate results of one load run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub elapsed: Duration,
    pub writes: u64,
    pub reads: u64,
    pub errors: u64,
    /// Sum of per-operation latencies, failed operations included.
    pub total_latency: Duration,
}

impl Summary {
    /// Operations that completed, successfully or not.
    pub fn ops(&self) -> u64 {
        self.writes + self.reads + self.errors
    }

    /// Operations per second over the wall-clock run time.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.ops() as f64 / secs
    }

    /// Mean latency in milliseconds, zero when nothing ran.
    pub fn avg_latency_ms(&self) -> f64 {
        match self.ops() {
            0 => 0.0,
            ops => self.total_latency.as_secs_f64() * 1000.0 / ops as f64,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ops={} elapsed={:.3?} throughput={:.2} ops/s writes={} reads={} errors={} avg_latency={:.2}ms",
            self.ops(),
            self.elapsed,
            self.throughput(),
            self.writes,
            self.reads,
            self.errors,
            self.avg_latency_ms()
        )
    }
}
