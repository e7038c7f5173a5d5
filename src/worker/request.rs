//! Fetch Request/Response Module
//!
//! Request and response values passed through the interception policy.

use axum::body::Bytes;
use axum::http::header::{ACCEPT, CACHE_CONTROL, EXPIRES, PRAGMA};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};

// == Fetch Request ==
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub method: Method,
    /// Path plus query, e.g. `/products?page=2`
    pub path: String,
    /// Top-level document navigation
    pub navigate: bool,
    pub headers: HeaderMap,
    /// Payload forwarded as-is; empty for GET
    pub body: Bytes,
}

impl FetchRequest {
    /// A plain GET for a subresource.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            navigate: false,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// A document navigation.
    pub fn navigation(path: impl Into<String>) -> Self {
        Self {
            navigate: true,
            ..Self::get(path)
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Path without the query string.
    pub fn pathname(&self) -> &str {
        self.path.split(['?', '#']).next().unwrap_or_default()
    }

    pub fn accepts_html(&self) -> bool {
        self.headers
            .get(ACCEPT)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|accept| accept.contains("text/html"))
    }

    /// Key used to match this request in a durable store.
    pub fn store_key(&self) -> &str {
        &self.path
    }

    /// Copy carrying headers that defeat every HTTP cache on the way.
    pub fn without_cache(&self) -> Self {
        let mut request = self.clone();
        request.headers.insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        request
            .headers
            .insert(PRAGMA, HeaderValue::from_static("no-cache"));
        request.headers.insert(EXPIRES, HeaderValue::from_static("0"));
        request
    }
}

// == Fetch Response ==
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl FetchResponse {
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(StatusCode::OK, body)
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

impl IntoResponse for FetchResponse {
    fn into_response(self) -> Response {
        (self.status, self.headers, self.body).into_response()
    }
}
