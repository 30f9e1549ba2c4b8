//! Shared application state.

use std::sync::Arc;

use crate::manager::ShardManager;
use crate::metrics::{LatencyMetrics, RequestObserver};

/// Shared application state.
///
/// Cloned for each request handler. The manager is immutable after
/// construction, so no locking is needed here.
#[derive(Clone)]
pub struct AppState {
    /// Routes user records to their shard.
    pub manager: Arc<ShardManager>,
    /// Receives timing for every manager call made by a handler.
    pub metrics: Arc<dyn RequestObserver>,
}

impl AppState {
    /// Creates state with the default in-process latency metrics.
    pub fn new(manager: Arc<ShardManager>) -> Self {
        Self::with_observer(manager, Arc::new(LatencyMetrics::new()))
    }

    pub fn with_observer(manager: Arc<ShardManager>, metrics: Arc<dyn RequestObserver>) -> Self {
        Self { manager, metrics }
    }
}
