//! Shared server state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use pulseboard_core::Result;

use crate::config::ServerConfig;
use crate::live::LiveCounterStore;
use crate::obs::ServerMetrics;
use crate::query::RangeQueryService;
use crate::store::{build_store, DocumentStore};

struct AppStateInner {
    cfg: ServerConfig,
    store: Arc<dyn DocumentStore>,
    query: RangeQueryService,
    live: LiveCounterStore,
    metrics: ServerMetrics,
    started: Instant,
}

/// Cheaply cloneable handle shared across handlers and background tasks.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

impl AppState {
    /// Build state from a validated config, instantiating its backend.
    pub fn new(cfg: ServerConfig) -> Result<Self> {
        let store = build_store(&cfg.store)?;
        Ok(Self::with_store(cfg, store))
    }

    /// Build state around an existing store.
    pub fn with_store(cfg: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let query = RangeQueryService::new(Arc::clone(&store));
        let live = LiveCounterStore::new(Arc::clone(&store));
        Self {
            inner: Arc::new(AppStateInner {
                cfg,
                store,
                query,
                live,
                metrics: ServerMetrics::default(),
                started: Instant::now(),
            }),
        }
    }

    pub fn cfg(&self) -> &ServerConfig {
        &self.inner.cfg
    }

    pub fn store(&self) -> Arc<dyn DocumentStore> {
        Arc::clone(&self.inner.store)
    }

    pub fn query(&self) -> &RangeQueryService {
        &self.inner.query
    }

    pub fn live(&self) -> &LiveCounterStore {
        &self.inner.live
    }

    pub fn metrics(&self) -> &ServerMetrics {
        &self.inner.metrics
    }

    pub fn window_hours(&self) -> u32 {
        self.inner.cfg.dashboard.window_hours
    }

    pub fn uptime(&self) -> Duration {
        self.inner.started.elapsed()
    }
}
