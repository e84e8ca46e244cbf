//! API Module
//!
//! HTTP handlers and routing for inspecting the named caches.
//!
//! # Endpoints
//! - `GET /caches` - List cache names
//! - `PUT /caches/:cache/entries` - Store a JSON value
//! - `GET /caches/:cache/entries/:key` - Retrieve a value by key
//! - `GET /caches/:cache/entries/:key/exists` - Presence check
//! - `DELETE /caches/:cache/entries/:key` - Delete a key
//! - `DELETE /caches/:cache` - Clear a cache
//! - `GET /caches/:cache/stats` - Diagnostic snapshot
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
