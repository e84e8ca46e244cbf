//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, exists_handler, get_handler, health_handler,
    list_caches_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (the server is a local debugging aid)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/caches", get(list_caches_handler))
        .route("/caches/:cache", delete(clear_handler))
        .route("/caches/:cache/stats", get(stats_handler))
        .route("/caches/:cache/entries", put(set_handler))
        .route(
            "/caches/:cache/entries/:key",
            get(get_handler).delete(delete_handler),
        )
        .route("/caches/:cache/entries/:key/exists", get(exists_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
