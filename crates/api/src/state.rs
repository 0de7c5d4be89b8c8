use std::sync::Arc;

use vlogcrew_events::JobStore;

use crate::config::ServerConfig;
use crate::vision::ImageDescriber;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (queue writes, health check).
    pub pool: vlogcrew_db::DbPool,
    /// Job status/event store (status reads).
    pub store: JobStore,
    pub config: Arc<ServerConfig>,
    /// Turns uploaded reference images into text.
    pub describer: Arc<dyn ImageDescriber>,
}

impl AppState {
    pub fn new(
        pool: vlogcrew_db::DbPool,
        config: ServerConfig,
        describer: Arc<dyn ImageDescriber>,
    ) -> Self {
        Self {
            store: JobStore::new(pool.clone()),
            pool,
            config: Arc::new(config),
            describer,
        }
    }
}
