//! Shared Cache Module
//!
//! Cloneable handle over a single `MemoryCache`, and the `with_cache`
//! memoization operation built on it.

use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::{CachePolicy, CacheStats, MemoryCache};

/// Per-call options for [`SharedCache::with_cache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// Skip the cached value and always call the fetcher
    pub force_refresh: bool,
}

impl FetchOptions {
    pub fn refresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

// == Shared Cache ==
/// Handle to the process cache.
///
/// Built once at startup and cloned into every consumer. All clones see the
/// same entries.
pub struct SharedCache<V> {
    inner: Arc<RwLock<MemoryCache<V>>>,
}

impl<V> Clone for SharedCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> SharedCache<V> {
    pub fn new(cache: MemoryCache<V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    // Reads take the write lock: expired entries are evicted and stats updated.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.inner.write().await.get(key)
    }

    pub async fn set(&self, key: impl Into<String>, value: V, policy: &CachePolicy) {
        self.inner.write().await.set(key, value, policy);
    }

    pub async fn invalidate(&self, tags: Option<&[&str]>) -> usize {
        self.inner.write().await.invalidate(tags)
    }

    pub async fn purge_expired(&self) -> usize {
        self.inner.write().await.purge_expired()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    pub async fn max_size(&self) -> usize {
        self.inner.read().await.max_size()
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.read().await.stats()
    }

    // == With Cache ==
    /// Returns the cached value for `key`, or runs `fetcher` and caches its
    /// result under `policy`.
    ///
    /// If the fetcher fails, the cache is consulted once more and a value
    /// still present is returned in place of the error. With nothing to fall
    /// back on, the fetcher's error is returned unchanged.
    ///
    /// The lock is not held while the fetcher runs, so concurrent misses on
    /// the same key each call their own fetcher.
    pub async fn with_cache<F, Fut, E>(
        &self,
        key: &str,
        fetcher: F,
        policy: &CachePolicy,
        options: FetchOptions,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
        E: Display,
    {
        if !options.force_refresh {
            if let Some(value) = self.get(key).await {
                debug!(key, "Cache hit");
                return Ok(value);
            }
        }

        match fetcher().await {
            Ok(value) => {
                self.set(key, value.clone(), policy).await;
                Ok(value)
            }
            Err(err) => {
                let mut cache = self.inner.write().await;
                match cache.get(key) {
                    Some(stale) => {
                        cache.record_stale_fallback();
                        warn!(key, error = %err, "Fetch failed, serving cached value");
                        Ok(stale)
                    }
                    None => Err(err),
                }
            }
        }
    }
}
