use std::sync::Arc;

use coldreach_core::config::Config;
use coldreach_core::store::{ContentStore, MetricStore};
use coldreach_duckdb::DuckDbBackend;

/// Shared application state injected into every Axum handler via
/// [`axum::extract::State`].
///
/// Handlers reach persistence only through the two store capabilities; the
/// concrete backend is kept for the health probe.
pub struct AppState {
    pub metrics: Arc<dyn MetricStore>,
    pub content: Arc<dyn ContentStore>,

    /// The DuckDB backend behind both stores.
    pub db: Arc<DuckDbBackend>,

    /// Parsed configuration, loaded once at startup from environment variables.
    pub config: Arc<Config>,
}

impl AppState {
    /// Construct a new `AppState` with `db` serving both store capabilities.
    pub fn new(db: DuckDbBackend, config: Config) -> Self {
        let db = Arc::new(db);
        Self {
            metrics: db.clone(),
            content: db.clone(),
            db,
            config: Arc::new(config),
        }
    }
}
