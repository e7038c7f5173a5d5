//! Request DTOs for the storefront edge API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

/// Request body for POST /cache/invalidate
///
/// # Fields
/// - `tags`: Tags to invalidate; omitted or null clears the whole cache
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl InvalidateRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        match &self.tags {
            Some(tags) if tags.is_empty() => {
                Some("Tags must be omitted or contain at least one tag".to_string())
            }
            Some(tags) if tags.iter().any(|t| t.trim().is_empty()) => {
                Some("Tags cannot be empty".to_string())
            }
            _ => None,
        }
    }
}
