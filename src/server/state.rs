use crate::{cache::ResponseCache, config::Config, upstream::LoungeClient};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,
    /// TTL/FIFO response cache, one instance per process
    pub cache: ResponseCache,
    /// Upstream ranking-API client with a pooled connection
    pub upstream: LoungeClient,
    /// Server start time, reported by the health endpoint
    pub started_at: Instant,
}

impl AppState {
    /// Create a new AppState with the given configuration
    pub fn new(config: Config) -> Self {
        let cache = ResponseCache::new(
            config.cache_max_entries,
            Duration::from_millis(config.cache_ttl_ms),
        );

        let upstream = LoungeClient::new(&config.upstream_url)
            .expect("UPSTREAM_URL must be a valid absolute URL");

        Self {
            config: Arc::new(config),
            cache,
            upstream,
            started_at: Instant::now(),
        }
    }
}
