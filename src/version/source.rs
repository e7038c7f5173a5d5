//! Version Source Module
//!
//! Asks the server which build it is currently serving.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use tracing::{debug, warn};

use crate::error::Result;
use crate::platform::{Clock, SystemClock};
use crate::version::VersionInfo;

// == Version Source ==
#[async_trait]
pub trait VersionSource: Send + Sync {
    /// Fetches the server's current version. Any transport, status or parse
    /// failure is an error.
    async fn fetch_version(&self) -> Result<VersionInfo>;
}

// == HTTP Version Source ==
/// Polls a JSON version endpoint with a cache-busting query token.
#[derive(Debug, Clone)]
pub struct HttpVersionSource {
    client: reqwest::Client,
    endpoint: String,
    clock: Arc<dyn Clock>,
}

impl HttpVersionSource {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, Arc::new(SystemClock))
    }

    pub fn with_client(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            clock,
        }
    }

    /// Endpoint URL with a `t=<now ms>` token so no cache layer answers.
    pub fn cache_busted_url(&self) -> String {
        let separator = if self.endpoint.contains('?') { '&' } else { '?' };
        format!("{}{}t={}", self.endpoint, separator, self.clock.now_ms())
    }
}

#[async_trait]
impl VersionSource for HttpVersionSource {
    async fn fetch_version(&self) -> Result<VersionInfo> {
        let url = self.cache_busted_url();
        debug!(%url, "Fetching server version");

        let info = self
            .client
            .get(&url)
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?
            .error_for_status()?
            .json::<VersionInfo>()
            .await?;

        Ok(info)
    }
}

// == Check For Updates ==
/// One-shot comparison against the server.
///
/// True only when the server reports a version different from
/// `current_version`. A failed request counts as "no update".
pub async fn check_for_updates(source: &dyn VersionSource, current_version: &str) -> bool {
    match source.fetch_version().await {
        Ok(info) => info.version != current_version,
        Err(err) => {
            warn!(error = %err, "Version check failed");
            false
        }
    }
}
