//! Shared state for every router

use std::sync::Arc;

use crate::auth::ApiKeyRing;
use crate::observability::MetricsRegistry;
use crate::store::Store;

/// State shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: Store,
    pub api_keys: ApiKeyRing,
    pub metrics: Arc<MetricsRegistry>,
}

impl AppState {
    /// Metrics are shared with the store so one registry sees both request
    /// and query counters
    pub fn new(store: Store, api_keys: ApiKeyRing) -> Self {
        let metrics = store.metrics().clone();
        Self {
            store,
            api_keys,
            metrics,
        }
    }
}
