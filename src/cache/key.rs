//! Cache Key Module
//!
//! Deterministic keys for parameterized queries.

use std::fmt::Display;

/// Builds a cache key from a prefix and query parameters.
///
/// Parameters are sorted by name so `{b: 2, a: 1}` and `{a: 1, b: 2}` land on
/// the same key. Format: `prefix:a:1|b:2`, or just `prefix` with no params.
pub fn cache_key<I, K, V>(prefix: &str, params: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Display,
{
    let mut pairs: Vec<(String, String)> = params
        .into_iter()
        .map(|(name, value)| (name.as_ref().to_string(), value.to_string()))
        .collect();

    if pairs.is_empty() {
        return prefix.to_string();
    }

    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let joined = pairs
        .iter()
        .map(|(name, value)| format!("{}:{}", name, value))
        .collect::<Vec<_>>()
        .join("|");

    format!("{}:{}", prefix, joined)
}
