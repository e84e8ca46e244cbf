//! Cache Statistics Module
//!
//! Diagnostic counters and the snapshot returned by `MemoryCache::stats`.

use serde::Serialize;

// == Counters ==
/// Running counters kept by a cache between snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Entries dropped by the capacity bound
    pub evictions: u64,
}

impl Counters {
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }
}

// == Cache Stats ==
/// Point-in-time diagnostic snapshot of a cache.
///
/// Only meant for debugging; `approx_bytes` is an estimate based on the JSON
/// encoding of each live key and entry.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats<K> {
    /// Number of live entries
    pub item_count: usize,
    /// Sum of the serialized sizes of live keys and entries
    pub approx_bytes: usize,
    /// Live keys, in no particular order
    pub keys: Vec<K>,
    pub hits: u64,
    pub misses: u64,
    pub expirations: u64,
    pub evictions: u64,
}

impl<K> CacheStats<K> {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
