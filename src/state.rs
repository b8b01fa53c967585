// src/state.rs
use std::sync::Arc;

use crate::services::metrics_manager::MetricsManager;
use crate::services::relay::ChatRelay;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub relay: ChatRelay,
    pub metrics: MetricsManager,
}

impl AppState {
    pub fn new(relay: ChatRelay) -> Self {
        Self {
            relay,
            metrics: MetricsManager::new(),
        }
    }
}
