//! Cache Module
//!
//! Provides in-memory caching with lazy TTL expiration and optional LRU
//! eviction.

mod clock;
mod entry;
mod lru;
mod registry;
mod stats;
mod store;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub(crate) use lru::LruTracker;
pub use registry::{shared, CacheRegistry, SharedCache};
pub use stats::CacheStats;
pub(crate) use stats::Counters;
pub use store::{MemoryCache, DEFAULT_TTL};
