//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

/// Cache names composed by the server when `CACHE_NAMES` is unset.
pub const DEFAULT_CACHE_NAMES: [&str; 4] = ["default", "products", "orders", "users"];

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in milliseconds for entries without explicit TTL (0 = never expire)
    pub default_ttl_ms: u64,
    /// Maximum number of entries per cache (0 = unbounded)
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Expired-entry sweep interval in milliseconds (0 = disabled)
    pub cleanup_interval_ms: u64,
    /// Names of the caches to create
    pub cache_names: Vec<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `MAX_ENTRIES` - Maximum entries per cache (default: 0, unbounded)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL_MS` - Sweep frequency in milliseconds (default: 1000)
    /// - `CACHE_NAMES` - Comma-separated cache names (default: default,products,orders,users)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            max_entries: parse_var("MAX_ENTRIES").unwrap_or(defaults.max_entries),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval_ms: parse_var("CLEANUP_INTERVAL_MS")
                .unwrap_or(defaults.cleanup_interval_ms),
            cache_names: env::var("CACHE_NAMES")
                .ok()
                .map(|v| parse_names(&v))
                .filter(|names| !names.is_empty())
                .unwrap_or(defaults.cache_names),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl_ms: 300_000,
            max_entries: 0,
            server_port: 3000,
            cleanup_interval_ms: 1_000,
            cache_names: DEFAULT_CACHE_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

/// Splits a comma-separated list, dropping blanks and duplicates.
fn parse_names(raw: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in raw.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_string());
        }
    }
    names
}
