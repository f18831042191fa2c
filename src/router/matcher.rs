//! Segment-wise path matcher.
//!
//! Compares a concrete request path against a route pattern such as
//! `/users/:id/posts`. Segments starting with [`CAPTURE_MARKER`] capture the
//! concrete value under the marker-less name; every other segment must match
//! exactly.

use std::collections::HashMap;

/// Prefix that turns a pattern segment into a named capture.
pub const CAPTURE_MARKER: char = ':';

/// Result of comparing one request path with one route pattern.
///
/// `params` is only meaningful when `is_match` is `true`; a failed attempt
/// always carries an empty map, even if earlier segments captured values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathMatch {
    pub is_match: bool,
    pub params: HashMap<String, String>,
}

impl PathMatch {
    #[inline]
    #[must_use]
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Match `requested_path` against `route_pattern`.
///
/// Both strings are split on `/`. A differing segment count is an immediate
/// miss. Segments are then walked left to right; the first static mismatch
/// discards everything captured so far.
///
/// ```
/// use consume::router::match_path;
///
/// let m = match_path("/users/123", "/users/:id");
/// assert!(m.is_match);
/// assert_eq!(m.params.get("id").map(String::as_str), Some("123"));
///
/// assert!(!match_path("/users/123/posts", "/users/:id").is_match);
/// ```
#[must_use]
pub fn match_path(requested_path: &str, route_pattern: &str) -> PathMatch {
    let requested: Vec<&str> = requested_path.split('/').collect();
    let pattern: Vec<&str> = route_pattern.split('/').collect();

    if requested.len() != pattern.len() {
        return PathMatch::miss();
    }

    let mut params = HashMap::new();
    for (segment, expected) in requested.iter().zip(pattern.iter()) {
        if let Some(name) = expected.strip_prefix(CAPTURE_MARKER) {
            params.insert(name.to_string(), (*segment).to_string());
        } else if segment != expected {
            return PathMatch::miss();
        }
    }

    PathMatch {
        is_match: true,
        params,
    }
}

/// Number of `/`-separated segments, the eligibility key for [`match_path`].
#[inline]
#[must_use]
pub fn segment_count(path: &str) -> usize {
    path.split('/').count()
}
