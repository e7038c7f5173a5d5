//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycles against a throwaway backend served on
//! a local port, so the real HTTP network and version source are exercised.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header::CONTENT_TYPE, HeaderMap, Request, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use storefront_edge::{
    api::create_router,
    platform::LogReloader,
    version::{check_for_updates, HttpVersionSource, PollTrigger, PollerConfig, VersionPoller},
    AppState, Config,
};
use tower::ServiceExt;

// == Mock Backend ==

#[derive(Clone, Default)]
struct Backend {
    product_calls: Arc<AtomicUsize>,
    down: Arc<AtomicBool>,
    version: Arc<Mutex<String>>,
}

async fn product(State(backend): State<Backend>) -> Result<Json<Value>, StatusCode> {
    backend.product_calls.fetch_add(1, Ordering::SeqCst);
    if backend.down.load(Ordering::SeqCst) {
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }
    Ok(Json(json!({ "id": 1, "name": "Shoe" })))
}

async fn version(State(backend): State<Backend>) -> Json<Value> {
    let version = backend.version.lock().unwrap().clone();
    Json(json!({ "version": version, "timestamp": 1 }))
}

async fn add_to_cart(headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let item: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);

    (
        StatusCode::CREATED,
        Json(json!({ "len": body.len(), "content_type": content_type, "item": item })),
    )
}

async fn spawn_backend() -> (Backend, String) {
    let backend = Backend::default();
    *backend.version.lock().unwrap() = "abc123".to_string();

    let app = Router::new()
        .route("/api/products/1", get(product))
        .route("/version.json", get(version))
        .route("/", get(|| async { "<html>home</html>" }))
        .route("/static/app.js", get(|| async { "console.log('app')" }))
        .route("/cart", post(add_to_cart))
        .with_state(backend.clone());

    let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (backend, format!("http://{}", addr))
}

// == Helper Functions ==

fn create_app(upstream: &str) -> (Router, AppState) {
    let config = Config {
        upstream_origin: upstream.to_string(),
        ..Config::default()
    };
    let state = AppState::from_config(&config);
    (create_router(state.clone()), state)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_path(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

// == Health and Version ==

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _) = create_app("http://127.0.0.1:9");

    let response = get_path(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn test_version_endpoint_reports_build() {
    let (app, state) = create_app("http://127.0.0.1:9");

    let response = get_path(&app, "/version.json").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["version"], state.build.version.as_str());
    assert_eq!(json["timestamp"], state.build.timestamp);
}

// == Memoized API Reads ==

#[tokio::test]
async fn test_api_reads_are_memoized() {
    let (backend, upstream) = spawn_backend().await;
    let (app, _) = create_app(&upstream);

    let first = get_path(&app, "/api/products/1").await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(body_to_json(first.into_body()).await["name"], "Shoe");

    let second = get_path(&app, "/api/products/1").await;
    assert_eq!(second.status(), StatusCode::OK);

    assert_eq!(backend.product_calls.load(Ordering::SeqCst), 1);

    let stats = body_to_json(get_path(&app, "/cache/stats").await.into_body()).await;
    assert_eq!(stats["hits"], 1);
    assert_eq!(stats["total_entries"], 1);
    assert_eq!(stats["max_size"], 100);
}

#[tokio::test]
async fn test_api_stale_fallback_when_backend_fails() {
    let (backend, upstream) = spawn_backend().await;
    let (app, _) = create_app(&upstream);

    get_path(&app, "/api/products/1").await;
    backend.down.store(true, Ordering::SeqCst);

    let response = get_path(&app, "/api/products/1?refresh=true").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["name"], "Shoe");
    assert_eq!(backend.product_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_api_failure_without_cache_is_bad_gateway() {
    let (backend, upstream) = spawn_backend().await;
    backend.down.store(true, Ordering::SeqCst);
    let (app, _) = create_app(&upstream);

    let response = get_path(&app, "/api/products/1").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
}

#[tokio::test]
async fn test_api_unknown_path_is_not_found() {
    let (_, upstream) = spawn_backend().await;
    let (app, _) = create_app(&upstream);

    let response = get_path(&app, "/api/products/999").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// == Invalidation ==

#[tokio::test]
async fn test_invalidate_by_tag_then_refetch() {
    let (backend, upstream) = spawn_backend().await;
    let (app, _) = create_app(&upstream);

    get_path(&app, "/api/products/1").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"tags":["products"]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);

    get_path(&app, "/api/products/1").await;
    assert_eq!(backend.product_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_rejects_empty_tag_list() {
    let (app, _) = create_app("http://127.0.0.1:9");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cache/invalidate")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"tags":[]}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// == Worker Proxy ==

#[tokio::test]
async fn test_install_and_cache_first_assets() {
    let (_, upstream) = spawn_backend().await;
    let (app, state) = create_app(&upstream);

    // manifest.json and favicon.ico are missing upstream
    assert!(state.worker.install().await.is_err());
    state.worker.activate().await;

    let response = get_path(&app, "/static/app.js").await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"console.log('app')");
}

#[tokio::test]
async fn test_post_body_reaches_backend() {
    let (_, upstream) = spawn_backend().await;
    let (app, _) = create_app(&upstream);
    let payload = r#"{"sku":"shoe","qty":2}"#;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/cart")
                .header("content-type", "application/json")
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["len"], payload.len());
    assert_eq!(json["content_type"], "application/json");
    assert_eq!(json["item"]["sku"], "shoe");
}

#[tokio::test]
async fn test_navigation_is_fetched_from_network() {
    let (_, upstream) = spawn_backend().await;
    let (app, _) = create_app(&upstream);

    let navigation = Request::builder()
        .uri("/")
        .header("accept", "text/html")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(navigation).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"<html>home</html>");
}

#[tokio::test]
async fn test_navigation_offline_without_cache_is_gateway_timeout() {
    let (app, _) = create_app("http://127.0.0.1:9");

    let navigation = Request::builder()
        .uri("/checkout")
        .header("accept", "text/html")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(navigation).await.unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

// == Version Polling ==

#[tokio::test]
async fn test_check_for_updates_against_live_endpoint() {
    let (backend, upstream) = spawn_backend().await;
    let source = HttpVersionSource::new(format!("{}/version.json", upstream));

    assert!(!check_for_updates(&source, "abc123").await);

    *backend.version.lock().unwrap() = "def456".to_string();
    assert!(check_for_updates(&source, "abc123").await);
}

#[tokio::test]
async fn test_check_for_updates_unreachable_is_false() {
    let source = HttpVersionSource::new("http://127.0.0.1:9/version.json");
    assert!(!check_for_updates(&source, "abc123").await);
}

#[tokio::test]
async fn test_update_status_endpoint_reflects_poller() {
    let (backend, upstream) = spawn_backend().await;
    *backend.version.lock().unwrap() = "def456".to_string();

    let reloader = Arc::new(LogReloader::new());
    let poller = Arc::new(VersionPoller::new(
        "abc123",
        Arc::new(HttpVersionSource::new(format!("{}/version.json", upstream))),
        reloader.clone(),
        PollerConfig {
            auto_reload: true,
            reload_delay: Duration::from_millis(20),
            ..PollerConfig::default()
        },
    ));

    assert!(poller.check_for_update(PollTrigger::Manual).await);

    let config = Config {
        upstream_origin: upstream.clone(),
        ..Config::default()
    };
    let app = create_router(AppState::from_config(&config).with_poller(poller));

    let response = get_path(&app, "/update/status").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["current_version"], "abc123");
    assert_eq!(json["is_update_available"], true);
    assert_eq!(json["is_checking"], false);

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(reloader.reload_count(), 1);
}
