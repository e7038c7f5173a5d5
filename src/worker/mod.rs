//! Worker Module
//!
//! Request-interception policy of the storefront's service worker: which
//! requests bypass caching, which go network-first and which cache-first,
//! plus the named durable cache stores it reads and writes.

mod request;
mod service;
mod storage;

pub use request::{FetchRequest, FetchResponse};
pub use service::{
    ServiceWorker, Strategy, WorkerMessage, WorkerReply, CACHE_PREFIX, DEFAULT_NO_CACHE,
    DEFAULT_PRECACHE,
};
pub use storage::{CacheStorage, MemoryCacheStorage, DEFAULT_STORE_CAPACITY};
