//! Network Module
//!
//! Outbound fetches against the storefront's upstream origin.

use async_trait::async_trait;
use axum::http::header::{CONNECTION, TRANSFER_ENCODING};
use tracing::debug;

use crate::error::Result;
use crate::worker::{FetchRequest, FetchResponse};

// == Network ==
/// Issues a request to the network and returns the full response.
///
/// Non-2xx answers are responses, not errors. Only transport failures
/// surface as `Err`.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse>;
}

// == HTTP Network ==
/// `Network` backed by reqwest, resolving request paths against an origin.
#[derive(Debug, Clone)]
pub struct HttpNetwork {
    client: reqwest::Client,
    origin: String,
}

impl HttpNetwork {
    /// Creates a network client for `origin` (e.g. `http://localhost:8080`).
    pub fn new(origin: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), origin)
    }

    pub fn with_client(client: reqwest::Client, origin: impl Into<String>) -> Self {
        Self {
            client,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Absolute URL for a request path.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.origin, path)
        } else {
            format!("{}/{}", self.origin, path)
        }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse> {
        let url = self.url_for(&request.path);
        debug!(method = %request.method, %url, "Upstream fetch");

        let response = self
            .client
            .request(request.method.clone(), &url)
            .headers(request.headers.clone())
            .body(request.body.clone())
            .send()
            .await?;

        let status = response.status();
        let mut headers = response.headers().clone();
        // The body is fully buffered, so framing headers no longer apply
        headers.remove(TRANSFER_ENCODING);
        headers.remove(CONNECTION);
        let body = response.bytes().await?;

        Ok(FetchResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for_joins_paths() {
        let network = HttpNetwork::new("http://shop.local/");
        assert_eq!(network.url_for("/api/products"), "http://shop.local/api/products");
        assert_eq!(network.url_for("favicon.ico"), "http://shop.local/favicon.ico");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_origin_is_upstream_error() {
        // Port 9 (discard) on localhost is almost never listening
        let network = HttpNetwork::new("http://127.0.0.1:9");
        let result = network.fetch(&FetchRequest::get("/")).await;
        assert!(result.is_err());
    }
}
