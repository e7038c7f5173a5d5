//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the memory cache can hold
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background expiry sweep interval in seconds
    pub cleanup_interval: u64,
    /// Origin of the storefront backend
    pub upstream_origin: String,
    /// Version endpoint to poll for new builds; polling is off when unset
    pub version_endpoint: Option<String>,
    /// Milliseconds between version checks
    pub poll_interval_ms: u64,
    /// Reload automatically when a new build is detected
    pub auto_reload: bool,
    /// Responses each service worker store keeps
    pub store_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 100)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Expiry sweep frequency in seconds (default: 60)
    /// - `UPSTREAM_ORIGIN` - Backend origin (default: http://localhost:8080)
    /// - `VERSION_ENDPOINT` - Version endpoint URL (default: unset)
    /// - `POLL_INTERVAL_MS` - Version check interval (default: 30000)
    /// - `AUTO_RELOAD` - `true`/`1` to reload on new builds (default: false)
    /// - `STORE_CAPACITY` - Responses per worker store (default: 500)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            upstream_origin: env::var("UPSTREAM_ORIGIN").unwrap_or(defaults.upstream_origin),
            version_endpoint: env::var("VERSION_ENDPOINT")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            poll_interval_ms: parse_var("POLL_INTERVAL_MS").unwrap_or(defaults.poll_interval_ms),
            auto_reload: env::var("AUTO_RELOAD")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.auto_reload),
            store_capacity: parse_var("STORE_CAPACITY").unwrap_or(defaults.store_capacity),
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    pub fn cleanup_period(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval.max(1))
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: crate::cache::DEFAULT_MAX_SIZE,
            server_port: 3000,
            cleanup_interval: 60,
            upstream_origin: "http://localhost:8080".to_string(),
            version_endpoint: None,
            poll_interval_ms: 30_000,
            auto_reload: false,
            store_capacity: crate::worker::DEFAULT_STORE_CAPACITY,
        }
    }
}
