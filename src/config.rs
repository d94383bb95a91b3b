use std::env;

/// Default base URL of the upstream lounge ranking API.
pub const DEFAULT_UPSTREAM_URL: &str = "https://lounge.mkcentral.com/api";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Dev mode relaxes CORS and config requirements (`NODE_ENV` != "production")
    pub is_dev: bool,
    /// Exact origin allowed by CORS in production
    pub frontend_url: Option<String>,
    /// Base URL of the upstream ranking API
    pub upstream_url: String,
    /// Response-cache entry bound before FIFO eviction kicks in
    pub cache_max_entries: usize,
    /// Default response-cache TTL in milliseconds
    pub cache_ttl_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    /// In dev mode everything has a sensible default; production requires PORT.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("NODE_ENV")
            .map(|v| v != "production")
            .unwrap_or(true);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        // CORS allow-list origin; the server falls back to a permissive
        // policy (with a warning) when unset in production
        let frontend_url = env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty());

        let upstream_url =
            env::var("UPSTREAM_URL").unwrap_or_else(|_| DEFAULT_UPSTREAM_URL.to_string());

        let cache_max_entries = env::var("CACHE_MAX_ENTRIES")
            .unwrap_or_else(|_| "1000".to_string())
            .parse()
            .unwrap_or(1000);

        let cache_ttl_ms = env::var("CACHE_TTL_MS")
            .unwrap_or_else(|_| "60000".to_string())
            .parse()
            .unwrap_or(60_000);

        Ok(Config {
            port,
            is_dev,
            frontend_url,
            upstream_url,
            cache_max_entries,
            cache_ttl_ms,
        })
    }
}
