//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use serde::Serialize;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// Timestamps come from the owning cache's [`Clock`](super::Clock), so an
/// entry never reads the time itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Time of the `set` that created this entry (Unix milliseconds)
    pub timestamp: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `now_ms` - Current time in milliseconds
    /// * `ttl_ms` - Lifetime in milliseconds; 0 disables expiry
    pub fn new(value: V, now_ms: u64, ttl_ms: u64) -> Self {
        let expires_at = (ttl_ms > 0).then(|| now_ms.saturating_add(ttl_ms));

        Self {
            value,
            timestamp: now_ms,
            expires_at,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time, so a fully elapsed TTL never yields a hit.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(0)` if the entry has expired
    /// - `Some(remaining_ms)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.expires_at.map(|expires| expires.saturating_sub(now_ms))
    }
}
