use std::sync::Arc;

use crate::config::AppConfig;
use crate::metrics::Metrics;
use crate::middleware::RateLimiter;
use crate::storage::Storage;

/// The shared application state.
///
/// Cloned into every handler by axum; all fields are cheap handles.
#[derive(Clone)]
pub struct AppState {
    /// The active storage engine (file or database backed).
    pub storage: Arc<dyn Storage>,
    /// The application configuration.
    pub config: Arc<AppConfig>,
    /// Request and mutation counters.
    pub metrics: Metrics,
    /// Per-client rate limiter.
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: AppConfig) -> Self {
        let rate_limiter = RateLimiter::new(config.rate_limit.max_requests, config.rate_limit.window_seconds);
        Self { storage, config: Arc::new(config), metrics: Metrics::new(), rate_limiter }
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }
}
