//! Cache Policy Module
//!
//! Freshness rules per content category, and the storefront's presets.

use std::time::Duration;

// == Cache Policy ==
/// TTL and tags applied to entries written under this policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachePolicy {
    /// Freshness window
    pub ttl: Duration,
    /// Advisory secondary window; never enforced by eviction
    pub stale_while_revalidate: Duration,
    /// Category labels attached to every entry written with this policy
    pub tags: Vec<String>,
}

impl CachePolicy {
    /// Creates an untagged policy with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            stale_while_revalidate: Duration::ZERO,
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stale_while_revalidate(mut self, window: Duration) -> Self {
        self.stale_while_revalidate = window;
        self
    }

    /// TTL in milliseconds, saturating at `u64::MAX`.
    pub fn ttl_ms(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }
}

// == Presets ==
/// Policies for the storefront's content categories.
pub mod presets {
    use super::CachePolicy;
    use std::time::Duration;

    const MINUTE: Duration = Duration::from_secs(60);

    /// A single product page.
    pub fn product() -> CachePolicy {
        CachePolicy::new(5 * MINUTE)
            .with_stale_while_revalidate(10 * MINUTE)
            .with_tags(["products"])
    }

    /// Product listings and search results.
    pub fn products() -> CachePolicy {
        CachePolicy::new(2 * MINUTE)
            .with_stale_while_revalidate(5 * MINUTE)
            .with_tags(["products"])
    }

    pub fn categories() -> CachePolicy {
        CachePolicy::new(30 * MINUTE)
            .with_stale_while_revalidate(60 * MINUTE)
            .with_tags(["categories"])
    }

    /// Images and other media metadata; rarely changes.
    pub fn media() -> CachePolicy {
        CachePolicy::new(60 * MINUTE)
            .with_stale_while_revalidate(24 * 60 * MINUTE)
            .with_tags(["media"])
    }

    pub fn reviews() -> CachePolicy {
        CachePolicy::new(5 * MINUTE).with_tags(["reviews"])
    }

    pub fn shipping() -> CachePolicy {
        CachePolicy::new(10 * MINUTE).with_tags(["shipping"])
    }

    /// Short-lived fallback for anything uncategorized.
    pub fn default_policy() -> CachePolicy {
        CachePolicy::new(MINUTE).with_tags(["api"])
    }

    /// Picks a policy from the first segment of a backend API path.
    ///
    /// `products/42` is a single product, `products` alone is a listing.
    pub fn for_path(path: &str) -> CachePolicy {
        let mut segments = path.trim_matches('/').split('/').filter(|s| !s.is_empty());
        let head = segments.next().unwrap_or_default();
        let has_id = segments.next().is_some();

        match head {
            "products" | "product" if has_id => product(),
            "products" | "product" | "search" => products(),
            "categories" | "category" => categories(),
            "media" | "images" => media(),
            "reviews" => reviews(),
            "shipping" => shipping(),
            _ => default_policy(),
        }
    }
}
