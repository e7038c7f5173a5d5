//! Cache Module
//!
//! Bounded in-memory cache with TTL expiry, tag invalidation and
//! insertion-order eviction, plus the `with_cache` memoization wrapper.

mod entry;
mod key;
mod order;
pub mod policy;
mod shared;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use key::cache_key;
pub use order::InsertionOrder;
pub use policy::CachePolicy;
pub use shared::{FetchOptions, SharedCache};
pub use stats::CacheStats;
pub use store::MemoryCache;

// == Public Constants ==
/// Default maximum number of entries held by a cache
pub const DEFAULT_MAX_SIZE: usize = 100;
