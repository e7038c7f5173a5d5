//! Build Info Module
//!
//! Version stamp baked in at compile time, and the wire format the
//! version-reporting endpoint serves.

use serde::{Deserialize, Serialize};

// == Version Info ==
/// Body of the version-reporting endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl VersionInfo {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            timestamp: None,
        }
    }
}

// == Build Info ==
/// Constants stamped by `build.rs`. Immutable for the life of the binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    /// Build version string
    pub version: String,
    /// Build time, Unix milliseconds
    pub timestamp: u64,
    /// Build time, RFC 3339
    pub build_time: String,
}

impl BuildInfo {
    /// The running binary's build stamp.
    pub fn current() -> Self {
        Self {
            version: env!("STOREFRONT_BUILD_VERSION").to_string(),
            timestamp: env!("STOREFRONT_BUILD_TIMESTAMP").parse().unwrap_or(0),
            build_time: env!("STOREFRONT_BUILD_TIME").to_string(),
        }
    }

    pub fn version_info(&self) -> VersionInfo {
        VersionInfo {
            version: self.version.clone(),
            timestamp: Some(self.timestamp),
        }
    }
}
