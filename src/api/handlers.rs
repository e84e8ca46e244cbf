//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CacheRegistry, SharedCache};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, CachesResponse, ClearResponse, DeleteResponse, ExistsResponse, GetResponse,
    HealthResponse, SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// Holds the registry composed at startup; handlers look caches up by name.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<CacheRegistry>,
}

impl AppState {
    /// Creates a new AppState around an existing registry.
    pub fn new(registry: CacheRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheRegistry::from_config(config))
    }

    /// Looks up a cache after rejecting malformed keys.
    fn keyed_cache(&self, name: &str, key: &str) -> Result<SharedCache<Value>> {
        validate_key(key).map_err(CacheError::InvalidRequest)?;
        self.cache(name)
    }

    fn cache(&self, name: &str) -> Result<SharedCache<Value>> {
        self.registry
            .get(name)
            .ok_or_else(|| CacheError::UnknownCache(name.to_string()))
    }
}

/// Handler for PUT /caches/:cache/entries
///
/// Stores a JSON value, with an explicit TTL when `ttl_ms` is given.
pub async fn set_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let cache = state.cache(&cache_name)?;
    let mut cache = cache.write().await;
    match req.ttl_ms {
        Some(ttl_ms) => {
            cache.set_with_ttl(req.key.clone(), req.value, Duration::from_millis(ttl_ms))
        }
        None => cache.set(req.key.clone(), req.value),
    }
    debug!("Set '{}' in cache '{}'", req.key, cache_name);

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /caches/:cache/entries/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path((cache_name, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let cache = state.keyed_cache(&cache_name, &key)?;
    // Write lock: lookups may evict expired entries and update counters
    let mut cache = cache.write().await;

    let value = cache
        .get(&key)
        .cloned()
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;
    let ttl_remaining_ms = cache
        .ttl_remaining(&key)
        .map(|ttl| ttl.as_millis() as u64);

    Ok(Json(GetResponse::new(key, value, ttl_remaining_ms)))
}

/// Handler for GET /caches/:cache/entries/:key/exists
pub async fn exists_handler(
    State(state): State<AppState>,
    Path((cache_name, key)): Path<(String, String)>,
) -> Result<Json<ExistsResponse>> {
    let cache = state.keyed_cache(&cache_name, &key)?;
    let exists = cache.write().await.has(&key);

    Ok(Json(ExistsResponse { key, exists }))
}

/// Handler for DELETE /caches/:cache/entries/:key
///
/// Idempotent: deleting an absent key is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path((cache_name, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let cache = state.keyed_cache(&cache_name, &key)?;
    let deleted = cache.write().await.delete(&key).is_some();

    Ok(Json(DeleteResponse { key, deleted }))
}

/// Handler for DELETE /caches/:cache
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache = state.cache(&cache_name)?;
    let cleared = cache.write().await.clear();
    debug!("Cleared {} entries from cache '{}'", cleared, cache_name);

    Ok(Json(ClearResponse {
        cache: cache_name,
        cleared,
    }))
}

/// Handler for GET /caches/:cache/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let cache = state.cache(&cache_name)?;
    let stats = cache.read().await.stats();

    Ok(Json(StatsResponse::new(cache_name, stats)))
}

/// Handler for GET /caches
pub async fn list_caches_handler(State(state): State<AppState>) -> Json<CachesResponse> {
    Json(CachesResponse {
        caches: state.registry.names(),
    })
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
