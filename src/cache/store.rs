//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order tracking,
//! TTL expiration and tag invalidation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheEntry, CachePolicy, CacheStats, InsertionOrder};
use crate::platform::{Clock, SystemClock};

// == Memory Cache ==
/// Bounded key/value store with TTL and tag-based invalidation.
///
/// When full, inserting a new key evicts the oldest-inserted entry.
/// Reads do not affect eviction order.
#[derive(Debug)]
pub struct MemoryCache<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion order, oldest first
    order: InsertionOrder,
    /// Performance statistics
    stats: CacheStats,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Time source for entry stamps
    clock: Arc<dyn Clock>,
}

impl<V: Clone> MemoryCache<V> {
    // == Constructor ==
    /// Creates a cache holding at most `max_size` entries, on the system clock.
    pub fn new(max_size: usize) -> Self {
        Self::with_clock(max_size, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit clock.
    ///
    /// A `max_size` of 0 is treated as 1.
    pub fn with_clock(max_size: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::new(),
            max_size: max_size.max(1),
            clock,
        }
    }

    // == Get ==
    /// Returns the value for `key` if present and not expired.
    ///
    /// An expired entry is removed on the way out.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();

        let valid = match self.entries.get(key) {
            Some(entry) => entry.is_valid(now),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if !valid {
            self.remove_entry(key);
            self.stats.record_expirations(1);
            self.stats.record_miss();
            debug!(key, "Cache entry expired");
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Set ==
    /// Stores `value` under `key` with the policy's TTL and tags.
    ///
    /// Expired entries are swept first. If the cache is still full and `key`
    /// is new, the oldest-inserted entry is evicted. Overwriting a key resets
    /// its timestamp and makes it the newest insertion.
    pub fn set(&mut self, key: impl Into<String>, value: V, policy: &CachePolicy) {
        let key = key.into();

        self.purge_expired();

        let is_overwrite = self.entries.contains_key(&key);
        if !is_overwrite && self.entries.len() >= self.max_size {
            if let Some(evicted) = self.order.pop_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "Evicted oldest cache entry");
            }
        }

        let entry = CacheEntry::new(value, self.clock.now_ms(), policy);
        self.entries.insert(key.clone(), entry);
        self.order.push(&key);

        self.stats.set_total_entries(self.entries.len());
    }

    // == Invalidate ==
    /// Removes entries by tag, or everything when `tags` is `None`.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate(&mut self, tags: Option<&[&str]>) -> usize {
        let removed = match tags {
            None => {
                let count = self.entries.len();
                self.entries.clear();
                self.order.clear();
                count
            }
            Some(tags) => {
                let matching: Vec<String> = self
                    .entries
                    .iter()
                    .filter(|(_, entry)| entry.has_any_tag(tags))
                    .map(|(key, _)| key.clone())
                    .collect();

                for key in &matching {
                    self.remove_entry(key);
                }
                matching.len()
            }
        };

        self.stats.set_total_entries(self.entries.len());
        debug!(removed, ?tags, "Cache invalidated");
        removed
    }

    // == Purge Expired ==
    /// Removes all expired entries. Returns the number removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        self.stats.record_expirations(expired.len());
        self.stats.set_total_entries(self.entries.len());
        expired.len()
    }

    /// Counts a failed fetch that was answered from the cache.
    pub(crate) fn record_stale_fallback(&mut self) {
        self.stats.record_stale_fallback();
    }

    fn remove_entry(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
        }
        self.stats.set_total_entries(self.entries.len());
    }
}

impl<V> MemoryCache<V> {
    /// Current number of entries, expired ones included until swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Alias of [`len`](Self::len) for diagnostics.
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }
}
