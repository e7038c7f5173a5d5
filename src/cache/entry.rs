//! Cache Entry Module
//!
//! Defines a single memoized value with its insertion time, TTL and tags.

use std::collections::HashSet;

use crate::cache::CachePolicy;

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The memoized value
    pub data: V,
    /// Insertion timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Lifetime in milliseconds
    pub ttl_ms: u64,
    /// Labels used for bulk invalidation
    pub tags: HashSet<String>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry stamped at `now_ms` using the policy's TTL and tags.
    pub fn new(data: V, now_ms: u64, policy: &CachePolicy) -> Self {
        Self {
            data,
            created_at: now_ms,
            ttl_ms: policy.ttl_ms(),
            tags: policy.tags.iter().cloned().collect(),
        }
    }

    // == Validity ==
    /// An entry is valid while `now - created_at <= ttl_ms`.
    ///
    /// The boundary itself is still valid: an entry with a 1000 ms TTL can be
    /// read at exactly 1000 ms after insertion and expires one tick later.
    pub fn is_valid(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.created_at) <= self.ttl_ms
    }

    pub fn is_expired(&self, now_ms: u64) -> bool {
        !self.is_valid(now_ms)
    }

    /// Remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: u64) -> u64 {
        self.created_at
            .saturating_add(self.ttl_ms)
            .saturating_sub(now_ms)
    }

    /// True if the entry carries at least one of `tags`.
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.iter().any(|tag| self.tags.contains(*tag))
    }
}
