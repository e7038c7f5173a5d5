//! Service Worker Module
//!
//! Decides a fetch strategy per request and runs it against the network and
//! the versioned durable cache store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::http::Method;
use tracing::{debug, info, warn};

use crate::error::{EdgeError, Result};
use crate::platform::Network;
use crate::worker::{CacheStorage, FetchRequest, FetchResponse};

/// Prefix of every store name this worker manages.
pub const CACHE_PREFIX: &str = "storefront-";

/// Entry points stored at install time.
pub const DEFAULT_PRECACHE: &[&str] = &["/", "/manifest.json", "/favicon.ico"];

/// Path prefixes that are never cached.
pub const DEFAULT_NO_CACHE: &[&str] = &["/api/", "/sw.js", "/version.json"];

// == Strategy ==
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Always the network, with cache-defeating headers; store untouched
    NoCache,
    /// Network first, durable store on failure
    NetworkFirst,
    /// Durable store first, network on miss
    CacheFirst,
}

/// Messages a page can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    SkipWaiting,
    GetVersion,
    ClearCaches,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerReply {
    Activated,
    Version(String),
    /// Number of stores deleted
    Cleared(usize),
}

// == Service Worker ==
pub struct ServiceWorker {
    version: String,
    cache_name: String,
    precache: Vec<String>,
    no_cache: Vec<String>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    active: AtomicBool,
}

impl ServiceWorker {
    /// Creates a worker for build `version`, storing into
    /// `storefront-<version>`.
    pub fn new(
        version: impl Into<String>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        let version = version.into();
        Self {
            cache_name: format!("{}{}", CACHE_PREFIX, version),
            version,
            precache: DEFAULT_PRECACHE.iter().map(|p| p.to_string()).collect(),
            no_cache: DEFAULT_NO_CACHE.iter().map(|p| p.to_string()).collect(),
            storage,
            network,
            active: AtomicBool::new(false),
        }
    }

    pub fn with_precache<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.precache = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_no_cache<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.no_cache = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn cache_name(&self) -> &str {
        &self.cache_name
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    // == Classify ==
    pub fn classify(&self, request: &FetchRequest) -> Strategy {
        let pathname = request.pathname();

        if request.method != Method::GET
            || self.no_cache.iter().any(|prefix| pathname.starts_with(prefix.as_str()))
        {
            Strategy::NoCache
        } else if request.navigate || request.accepts_html() {
            Strategy::NetworkFirst
        } else {
            Strategy::CacheFirst
        }
    }

    // == Handle Fetch ==
    pub async fn handle_fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let strategy = self.classify(request);
        debug!(path = %request.path, ?strategy, "Intercepted fetch");

        match strategy {
            Strategy::NoCache => self.network.fetch(&request.without_cache()).await,
            Strategy::NetworkFirst => self.network_first(request).await,
            Strategy::CacheFirst => self.cache_first(request).await,
        }
    }

    async fn network_first(&self, request: &FetchRequest) -> Result<FetchResponse> {
        match self.network.fetch(&request.without_cache()).await {
            Ok(response) => {
                if response.is_success() {
                    self.storage
                        .put(&self.cache_name, request, response.clone())
                        .await;
                }
                Ok(response)
            }
            Err(err) => {
                warn!(path = %request.path, error = %err, "Network failed, trying cache");
                self.storage
                    .match_request(&self.cache_name, request)
                    .await
                    .ok_or_else(|| EdgeError::Offline(format!("{} is not cached", request.path)))
            }
        }
    }

    async fn cache_first(&self, request: &FetchRequest) -> Result<FetchResponse> {
        if let Some(cached) = self.storage.match_request(&self.cache_name, request).await {
            return Ok(cached);
        }

        let response = self.network.fetch(request).await?;
        if response.is_success() {
            self.storage
                .put(&self.cache_name, request, response.clone())
                .await;
        }
        Ok(response)
    }

    // == Lifecycle ==
    /// Stores every precache entry point in the current store.
    ///
    /// Each path is attempted; any failure is logged and reported as an
    /// error once all have been tried. Returns the number stored.
    pub async fn install(&self) -> Result<usize> {
        self.storage.open(&self.cache_name).await;

        let mut stored = 0;
        let mut failed = Vec::new();

        for path in &self.precache {
            let request = FetchRequest::get(path.as_str());
            match self.network.fetch(&request.without_cache()).await {
                Ok(response) if response.is_success() => {
                    self.storage.put(&self.cache_name, &request, response).await;
                    stored += 1;
                }
                Ok(response) => {
                    warn!(%path, status = %response.status, "Precache got non-success status");
                    failed.push(path.clone());
                }
                Err(err) => {
                    warn!(%path, error = %err, "Precache fetch failed");
                    failed.push(path.clone());
                }
            }
        }

        if !failed.is_empty() {
            return Err(EdgeError::Upstream(format!(
                "precache failed for {}",
                failed.join(", ")
            )));
        }

        info!(cache = %self.cache_name, stored, "Service worker installed");
        Ok(stored)
    }

    /// Deletes every store not belonging to this build and marks the worker
    /// active. Returns the deleted store names.
    pub async fn activate(&self) -> Vec<String> {
        let mut deleted = Vec::new();

        for name in self.storage.keys().await {
            if name != self.cache_name && self.storage.delete(&name).await {
                debug!(cache = %name, "Deleted outdated cache");
                deleted.push(name);
            }
        }

        self.active.store(true, Ordering::SeqCst);
        info!(cache = %self.cache_name, removed = deleted.len(), "Service worker activated");
        deleted
    }

    // == Messages ==
    pub async fn handle_message(&self, message: WorkerMessage) -> WorkerReply {
        match message {
            WorkerMessage::SkipWaiting => {
                self.active.store(true, Ordering::SeqCst);
                WorkerReply::Activated
            }
            WorkerMessage::GetVersion => WorkerReply::Version(self.version.clone()),
            WorkerMessage::ClearCaches => {
                let mut cleared = 0;
                for name in self.storage.keys().await {
                    if self.storage.delete(&name).await {
                        cleared += 1;
                    }
                }
                info!(cleared, "Cleared all caches");
                WorkerReply::Cleared(cleared)
            }
        }
    }
}
