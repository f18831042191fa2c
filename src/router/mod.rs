//! # Router Module
//!
//! Path matching and endpoint resolution.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Holding the ordered list of registered endpoints ([`Registry`])
//! - Merging route groups under a path prefix
//! - Matching incoming paths against `:name` style patterns ([`match_path`])
//! - Telling a method mismatch apart from an unknown path ([`Resolution`])
//!
//! ## Architecture
//!
//! The router has two phases:
//!
//! 1. **Building**: endpoints are appended to a [`Registry`] in registration
//!    order. Route groups are flattened into the same list.
//!
//! 2. **Serving**: [`Registry::freeze`] turns the list into an immutable
//!    [`Router`]. Each request is resolved by walking the endpoints in order;
//!    the first endpoint whose path matches wins, whatever its method.
//!
//! ## Example
//!
//! ```rust
//! use consume::router::{Method, Registry, Resolution, RouteGroup};
//!
//! let mut users = RouteGroup::new();
//! users.get("/:id", |_req, res| res.ok(serde_json::json!({})));
//!
//! let mut registry = Registry::new();
//! registry.merge_group("/users", &users).unwrap();
//! let router = registry.freeze();
//!
//! match router.resolve(&http::Method::GET, "/users/42") {
//!     Resolution::Matched { endpoint, params } => {
//!         assert_eq!(endpoint.method(), Method::Get);
//!         assert_eq!(params["id"], "42");
//!     }
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Performance
//!
//! Matching is O(segments) per endpoint with no backtracking; resolution is
//! a linear scan over the endpoints, which keeps registration order as the
//! only priority rule.

mod core;
mod matcher;
#[cfg(test)]
mod tests;

pub(crate) use core::endpoint_shorthands;
pub use core::{Endpoint, EndpointTarget, Method, Registry, RegistryError, Resolution, RouteGroup, Router};
pub use matcher::{match_path, segment_count, PathMatch, CAPTURE_MARKER};
