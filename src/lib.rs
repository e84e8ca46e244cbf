//! Memo Cache - A process-local memoization cache
//!
//! Key/value storage with lazily checked per-entry TTL, an optional LRU
//! bound, and a small HTTP server for inspecting named caches.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheRegistry, Clock, ManualClock, MemoryCache, SharedCache, SystemClock};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
