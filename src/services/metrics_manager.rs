use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::Model;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelCounters {
    pub requests: u64,
    pub succeeded: u64,
    pub rejected: u64,
    pub upstream_failures: u64,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MetricsData {
    pub models: BTreeMap<Model, ModelCounters>,
}

/// Outcome of one inbound call, as counted by [`MetricsManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Rejected,
    UpstreamFailed,
}

#[derive(Debug, Clone)]
pub struct MetricsManager {
    inner: Arc<RwLock<MetricsData>>,
}

impl Default for MetricsManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsManager {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MetricsData::default())),
        }
    }

    pub async fn record(&self, model: Model, outcome: Outcome) {
        let mut data = self.inner.write().await;
        let counters = data.models.entry(model).or_default();
        counters.requests += 1;
        match outcome {
            Outcome::Succeeded => counters.succeeded += 1,
            Outcome::Rejected => counters.rejected += 1,
            Outcome::UpstreamFailed => counters.upstream_failures += 1,
        }
    }

    pub async fn get_metrics(&self) -> MetricsData {
        self.inner.read().await.clone()
    }
}
