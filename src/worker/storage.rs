//! Cache Storage Module
//!
//! Named stores of responses keyed by request, as the service worker sees
//! the platform's durable cache.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::InsertionOrder;
use crate::worker::{FetchRequest, FetchResponse};

/// Responses a single named store holds before its oldest entry is dropped.
pub const DEFAULT_STORE_CAPACITY: usize = 500;

// == Cache Storage ==
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Creates the named store if it does not exist.
    async fn open(&self, name: &str);

    async fn match_request(&self, name: &str, request: &FetchRequest) -> Option<FetchResponse>;

    /// Stores `response` for `request`, creating the store if needed.
    /// Last write wins.
    async fn put(&self, name: &str, request: &FetchRequest, response: FetchResponse);

    /// Deletes a whole named store. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> bool;

    /// Names of all stores.
    async fn keys(&self) -> Vec<String>;
}

// == Memory Cache Storage ==
/// One named store: responses by request key plus their insertion order.
#[derive(Debug, Default)]
struct NamedStore {
    responses: HashMap<String, FetchResponse>,
    order: InsertionOrder,
}

/// In-process `CacheStorage`.
///
/// Every client of the server shares these stores, so each one is capped
/// and drops its oldest insertion once full.
#[derive(Debug)]
pub struct MemoryCacheStorage {
    stores: RwLock<HashMap<String, NamedStore>>,
    capacity: usize,
}

impl Default for MemoryCacheStorage {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_STORE_CAPACITY)
    }
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage whose stores each hold at most `capacity` responses (min 1).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            stores: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of responses in a store, 0 if it does not exist.
    pub async fn entry_count(&self, name: &str) -> usize {
        self.stores
            .read()
            .await
            .get(name)
            .map(|store| store.responses.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) {
        self.stores
            .write()
            .await
            .entry(name.to_string())
            .or_default();
    }

    async fn match_request(&self, name: &str, request: &FetchRequest) -> Option<FetchResponse> {
        self.stores
            .read()
            .await
            .get(name)
            .and_then(|store| store.responses.get(request.store_key()))
            .cloned()
    }

    async fn put(&self, name: &str, request: &FetchRequest, response: FetchResponse) {
        let mut stores = self.stores.write().await;
        let store = stores.entry(name.to_string()).or_default();
        let key = request.store_key();

        if !store.responses.contains_key(key) && store.responses.len() >= self.capacity {
            if let Some(oldest) = store.order.pop_oldest() {
                store.responses.remove(&oldest);
                debug!(cache = %name, evicted = %oldest, "Store full, dropped oldest response");
            }
        }

        store.order.push(key);
        store.responses.insert(key.to_string(), response);
    }

    async fn delete(&self, name: &str) -> bool {
        self.stores.write().await.remove(name).is_some()
    }

    async fn keys(&self) -> Vec<String> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        names
    }
}
