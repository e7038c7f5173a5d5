//! API Module
//!
//! HTTP handlers and routing for the storefront edge.
//!
//! # Endpoints
//! - `GET /health` - Health check endpoint
//! - `GET /version.json` - Version of the running build
//! - `GET /update/status` - State of the build version poller
//! - `POST /update/check` - Run a manual version check
//! - `POST /update/reload` - Reload now
//! - `GET /cache/stats` - Memory cache statistics
//! - `POST /cache/invalidate` - Invalidate cache entries by tag
//! - `GET /api/*path` - Memoized backend API reads
//! - anything else - proxied through the service worker policy

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
