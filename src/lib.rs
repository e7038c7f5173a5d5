//! Storefront Edge - caching and update detection for a storefront
//!
//! Provides a tag-aware TTL memory cache, build version polling with
//! update signaling, and a service-worker style request interception policy.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod platform;
pub mod tasks;
pub mod version;
pub mod worker;

pub use api::AppState;
pub use config::Config;
pub use tasks::{spawn_cleanup_task, spawn_version_poller};
