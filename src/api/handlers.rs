//! API Handlers
//!
//! HTTP request handlers for each storefront edge endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, RawQuery, State},
    http::{
        header::{ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONTENT_TYPE, EXPIRES, PRAGMA},
        HeaderMap, Method, StatusCode, Uri,
    },
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{cache_key, policy::presets, FetchOptions, MemoryCache, SharedCache};
use crate::config::Config;
use crate::error::{EdgeError, Result};
use crate::models::{HealthResponse, InvalidateRequest, InvalidateResponse, StatsResponse};
use crate::platform::{HttpNetwork, Network};
use crate::version::{BuildInfo, PollTrigger, VersionPoller, VersionState};
use crate::worker::{CacheStorage, FetchRequest, FetchResponse, MemoryCacheStorage, ServiceWorker};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Memoized backend API reads
    pub cache: SharedCache<Value>,
    /// Interception policy for everything outside `/api`
    pub worker: Arc<ServiceWorker>,
    /// Backend origin
    pub network: Arc<dyn Network>,
    /// Stamp of the running build
    pub build: Arc<BuildInfo>,
    /// Poller watching for newer builds, when enabled
    pub poller: Option<Arc<VersionPoller>>,
}

impl AppState {
    /// Creates a new AppState from its parts.
    pub fn new(cache: MemoryCache<Value>, network: Arc<dyn Network>, build: BuildInfo) -> Self {
        Self::with_storage(cache, network, build, Arc::new(MemoryCacheStorage::new()))
    }

    /// Like `new`, with an explicit durable store for the worker.
    pub fn with_storage(
        cache: MemoryCache<Value>,
        network: Arc<dyn Network>,
        build: BuildInfo,
        storage: Arc<dyn CacheStorage>,
    ) -> Self {
        let worker = ServiceWorker::new(build.version.clone(), storage, Arc::clone(&network));

        Self {
            cache: SharedCache::new(cache),
            worker: Arc::new(worker),
            network,
            build: Arc::new(build),
            poller: None,
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        let network = Arc::new(HttpNetwork::new(config.upstream_origin.clone()));
        Self::with_storage(
            MemoryCache::new(config.max_entries),
            network,
            BuildInfo::current(),
            Arc::new(MemoryCacheStorage::with_capacity(config.store_capacity)),
        )
    }

    pub fn with_poller(mut self, poller: Arc<VersionPoller>) -> Self {
        self.poller = Some(poller);
        self
    }
}

fn no_store_headers() -> [(axum::http::HeaderName, &'static str); 3] {
    [
        (CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
        (PRAGMA, "no-cache"),
        (EXPIRES, "0"),
    ]
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /version.json
///
/// Reports the running build; never cacheable.
pub async fn version_handler(State(state): State<AppState>) -> impl IntoResponse {
    (no_store_headers(), Json(state.build.version_info()))
}

fn poller_of(state: &AppState) -> Result<&Arc<VersionPoller>> {
    state
        .poller
        .as_ref()
        .ok_or_else(|| EdgeError::NotFound("version polling is disabled".to_string()))
}

/// Handler for GET /update/status
pub async fn update_status_handler(State(state): State<AppState>) -> Result<Json<VersionState>> {
    Ok(Json(poller_of(&state)?.state()))
}

/// Handler for POST /update/check
///
/// Runs a manual version check now. Dropped if a check is already in flight.
pub async fn update_check_handler(State(state): State<AppState>) -> Result<Json<VersionState>> {
    let poller = poller_of(&state)?;
    poller.check_for_update(PollTrigger::Manual).await;

    Ok(Json(poller.state()))
}

/// Handler for POST /update/reload
pub async fn update_reload_handler(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<VersionState>)> {
    let poller = poller_of(&state)?;
    poller.reload_now();

    Ok((StatusCode::ACCEPTED, Json(poller.state())))
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    let max_size = state.cache.max_size().await;

    Json(StatsResponse::new(&stats, max_size))
}

/// Handler for POST /cache/invalidate
///
/// Removes entries carrying any of the given tags, or everything when no
/// tags are given.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(EdgeError::InvalidRequest(error_msg));
    }

    let removed = match &req.tags {
        Some(tags) => {
            let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
            state.cache.invalidate(Some(tags.as_slice())).await
        }
        None => state.cache.invalidate(None).await,
    };

    Ok(Json(InvalidateResponse { removed }))
}

/// Handler for GET /api/*path
///
/// Memoized read of the backend API. The cache key is built from the path
/// and the sorted query parameters; `refresh=true` bypasses the cached value.
pub async fn api_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(mut params): Query<BTreeMap<String, String>>,
    RawQuery(raw_query): RawQuery,
) -> Result<Json<Value>> {
    let options = FetchOptions {
        force_refresh: params.remove("refresh").as_deref() == Some("true"),
    };
    let policy = presets::for_path(&path);
    let key = cache_key(&format!("api:{}", path), &params);

    let upstream_path = match raw_query {
        Some(query) if !query.is_empty() => format!("/api/{}?{}", path, query),
        _ => format!("/api/{}", path),
    };
    let request = FetchRequest::get(upstream_path)
        .with_header(ACCEPT, axum::http::HeaderValue::from_static("application/json"));

    let network = Arc::clone(&state.network);
    let value = state
        .cache
        .with_cache(
            &key,
            move || async move { fetch_json(network.as_ref(), &request).await },
            &policy,
            options,
        )
        .await?;

    Ok(Json(value))
}

async fn fetch_json(network: &dyn Network, request: &FetchRequest) -> Result<Value> {
    let response = network.fetch(request).await?;

    match response.status {
        status if status.is_success() => Ok(serde_json::from_slice(&response.body)?),
        StatusCode::NOT_FOUND => Err(EdgeError::NotFound(request.path.clone())),
        status => Err(EdgeError::Upstream(format!(
            "{} returned {}",
            request.path, status
        ))),
    }
}

/// Fallback handler for every other path
///
/// Runs the request through the service worker's interception policy.
/// Write requests are passed through with their body and content type.
pub async fn proxy_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Result<FetchResponse> {
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| "/".to_string());

    let mut request = FetchRequest::get(path).with_method(method).with_body(body);
    for name in [ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE] {
        if let Some(value) = headers.get(&name) {
            request.headers.insert(name, value.clone());
        }
    }
    request.navigate = request.accepts_html();

    debug!(path = %request.path, navigate = request.navigate, "Proxying through worker");
    state.worker.handle_fetch(&request).await
}
