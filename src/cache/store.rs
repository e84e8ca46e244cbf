//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with lazy TTL expiry and an
//! optional LRU capacity bound.

use std::borrow::Borrow;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, Counters, LruTracker, SystemClock};

/// TTL applied by [`MemoryCache::set`] unless overridden.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

// == Memory Cache ==
/// Process-local key/value store with per-entry expiry.
///
/// Expiry is checked against the injected [`Clock`] whenever an entry is
/// looked up, so there are no timers: each entry carries a single deadline
/// that a later `set` on the same key replaces. Expired entries that are
/// never looked up again are dropped by [`purge_expired`](Self::purge_expired).
///
/// The store is unbounded unless [`with_max_entries`](Self::with_max_entries)
/// is used, in which case the least recently used entry makes room for new
/// keys.
#[derive(Debug)]
pub struct MemoryCache<K, V, C = SystemClock> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Access order, only maintained when bounded
    lru: LruTracker<K>,
    counters: Counters,
    clock: C,
    default_ttl: Duration,
    max_entries: Option<usize>,
}

impl<K, V> MemoryCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    // == Constructor ==
    /// Creates an unbounded cache on the system clock with a 5 minute TTL.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V> Default for MemoryCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> MemoryCache<K, V, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    /// Creates an unbounded cache reading time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            counters: Counters::default(),
            clock,
            default_ttl: DEFAULT_TTL,
            max_entries: None,
        }
    }

    /// Sets the TTL used by [`set`](Self::set). Zero disables expiry.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Bounds the cache to `max_entries` live entries. Zero means unbounded.
    ///
    /// Entries already stored join the access order oldest-write first, and
    /// the cache is trimmed to the bound right away.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        let was_bounded = self.max_entries.is_some();
        self.max_entries = (max_entries > 0).then_some(max_entries);

        match self.max_entries {
            Some(max) => {
                if !was_bounded {
                    let mut keys: Vec<(u64, K)> = self
                        .entries
                        .iter()
                        .map(|(key, entry)| (entry.timestamp, key.clone()))
                        .collect();
                    keys.sort_by_key(|(timestamp, _)| *timestamp);
                    for (_, key) in keys {
                        self.lru.touch(&key);
                    }
                }
                self.purge_expired();
                while self.entries.len() > max {
                    self.evict_one(max);
                }
            }
            None => self.lru.clear(),
        }
        self
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    // == Set ==
    /// Stores `value` under `key` with the default TTL.
    pub fn set(&mut self, key: K, value: V) {
        let ttl = self.default_ttl;
        self.set_with_ttl(key, value, ttl);
    }

    /// Stores `value` under `key`, expiring `ttl` from now.
    ///
    /// A zero `ttl` keeps the entry until it is deleted. Any previous entry
    /// for `key` is replaced along with its deadline.
    pub fn set_with_ttl(&mut self, key: K, value: V, ttl: Duration) {
        let now = self.clock.now_ms();

        if !self.entries.contains_key(&key) {
            self.make_room();
        }
        if self.max_entries.is_some() {
            self.lru.touch(&key);
        }

        self.entries.insert(key, CacheEntry::new(value, now, ttl_to_ms(ttl)));
    }

    // == Get ==
    /// Returns the live value for `key`.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.retain_if_live(key) {
            self.counters.record_miss();
            return None;
        }

        self.counters.record_hit();
        self.touch(key);
        self.entries.get(key).map(|entry| &entry.value)
    }

    // == Has ==
    /// Presence check, consistent with [`get`](Self::get).
    pub fn has<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.retain_if_live(key)
    }

    // == Get Or Insert ==
    /// Returns the live value for `key`, computing and storing it with the
    /// default TTL when absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, f: F) -> &V
    where
        F: FnOnce() -> V,
    {
        if self.retain_if_live(&key) {
            self.counters.record_hit();
            self.touch(&key);
        } else {
            self.counters.record_miss();
            self.make_room();
        }

        let now = self.clock.now_ms();
        let ttl_ms = ttl_to_ms(self.default_ttl);
        let bounded = self.max_entries.is_some();

        match self.entries.entry(key) {
            Entry::Occupied(occupied) => &occupied.into_mut().value,
            Entry::Vacant(vacant) => {
                if bounded {
                    self.lru.touch(vacant.key());
                }
                &vacant.insert(CacheEntry::new(f(), now, ttl_ms)).value
            }
        }
    }

    // == Delete ==
    /// Removes `key`, returning its value if it was live. Absent keys are a
    /// no-op.
    pub fn delete<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let entry = self.entries.remove(key)?;
        self.lru.remove(key);

        if entry.is_expired_at(self.clock.now_ms()) {
            self.counters.record_expirations(1);
            None
        } else {
            Some(entry.value)
        }
    }

    // == Clear ==
    /// Removes every entry. Returns how many live entries were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.len();
        self.entries.clear();
        self.lru.clear();
        debug!("Cache cleared: {} entries removed", removed);
        removed
    }

    // == Time To Live ==
    /// Remaining lifetime of a live entry; None for absent entries and for
    /// entries that never expire.
    pub fn ttl_remaining<Q>(&self, key: &Q) -> Option<Duration>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired_at(now))
            .and_then(|entry| entry.ttl_remaining_ms(now))
            .map(Duration::from_millis)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired_keys: Vec<K> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.lru.remove(&key);
        }

        self.counters.record_expirations(count);
        count
    }

    // == Length ==
    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now_ms();
        self.entries
            .values()
            .filter(|entry| !entry.is_expired_at(now))
            .count()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // == Stats ==
    /// Diagnostic snapshot of the live entries and running counters.
    pub fn stats(&self) -> CacheStats<K>
    where
        K: Serialize,
        V: Serialize,
    {
        let now = self.clock.now_ms();
        let mut keys = Vec::new();
        let mut approx_bytes = 0;

        for (key, entry) in &self.entries {
            if entry.is_expired_at(now) {
                continue;
            }
            approx_bytes += serialized_len(key) + serialized_len(entry);
            keys.push(key.clone());
        }

        CacheStats {
            item_count: keys.len(),
            approx_bytes,
            keys,
            hits: self.counters.hits,
            misses: self.counters.misses,
            expirations: self.counters.expirations,
            evictions: self.counters.evictions,
        }
    }

    // == Internals ==
    /// Drops `key` if it has expired. Returns whether a live entry remains.
    fn retain_if_live<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired_at(now),
            None => return false,
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.counters.record_expirations(1);
        }
        !expired
    }

    fn touch<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if self.max_entries.is_none() {
            return;
        }
        if let Some((stored, _)) = self.entries.get_key_value(key) {
            let stored = stored.clone();
            self.lru.touch(&stored);
        }
    }

    /// Frees a slot for a new key when the cache is bounded and full.
    ///
    /// Expired entries go first; live entries are then evicted oldest-first.
    fn make_room(&mut self) {
        let Some(max) = self.max_entries else {
            return;
        };
        if self.entries.len() < max {
            return;
        }

        self.purge_expired();

        while self.entries.len() >= max {
            self.evict_one(max);
        }
    }

    /// Evicts the least recently used entry. Keys missing from the access
    /// order fall back to the oldest write so eviction always makes progress.
    fn evict_one(&mut self, max: usize) {
        let victim = loop {
            match self.lru.evict_oldest() {
                Some(key) if self.entries.contains_key(&key) => break Some(key),
                Some(_) => continue,
                None => {
                    break self
                        .entries
                        .iter()
                        .min_by_key(|(_, entry)| entry.timestamp)
                        .map(|(key, _)| key.clone())
                }
            }
        };

        if let Some(key) = victim {
            self.entries.remove(&key);
            self.counters.record_eviction();
            debug!("Evicted least recently used entry to stay within {} entries", max);
        }
    }
}

/// Converts a TTL to whole milliseconds, rounding sub-millisecond TTLs up so
/// they still expire.
fn ttl_to_ms(ttl: Duration) -> u64 {
    if ttl.is_zero() {
        return 0;
    }
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

fn serialized_len<T: Serialize + ?Sized>(value: &T) -> usize {
    serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
}
