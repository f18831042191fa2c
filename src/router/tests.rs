use super::*;
use crate::server::{Request, Response};
use std::sync::Arc;

fn noop(_req: &Request, _res: &mut Response) {}

fn target() -> EndpointTarget {
    EndpointTarget::Handler(Arc::new(noop))
}

#[test]
fn test_capture_segment() {
    let m = match_path("/users/123", "/users/:id");
    assert!(m.is_match);
    assert_eq!(m.params.len(), 1);
    assert_eq!(m.params["id"], "123");
}

#[test]
fn test_static_mismatch_without_marker() {
    assert_eq!(match_path("/users/123", "/users/id"), PathMatch::miss());
}

#[test]
fn test_segment_count_mismatch() {
    assert_eq!(match_path("/users/123/posts", "/users/:id"), PathMatch::miss());
    assert_eq!(match_path("/users", "/users/:id"), PathMatch::miss());
    assert_eq!(segment_count("/users/123/posts"), 4);
}

#[test]
fn test_late_mismatch_discards_captures() {
    let m = match_path("/users/123/comments", "/users/:id/posts");
    assert!(!m.is_match);
    assert!(m.params.is_empty());
}

#[test]
fn test_multiple_captures() {
    let m = match_path("/users/7/posts/abc", "/users/:id/posts/:post");
    assert!(m.is_match);
    assert_eq!(m.params["id"], "7");
    assert_eq!(m.params["post"], "abc");
}

#[test]
fn test_capture_accepts_empty_segment() {
    // "/users/" splits into ["", "users", ""]
    let m = match_path("/users/", "/users/:id");
    assert!(m.is_match);
    assert_eq!(m.params["id"], "");
}

#[test]
fn test_root_path() {
    assert!(match_path("/", "/").is_match);
    assert!(!match_path("/", "/:id/x").is_match);
}

#[test]
fn test_registry_rejects_relative_pattern() {
    let mut registry = Registry::new();
    let err = registry
        .register(Endpoint::new(Method::Get, "users", target()))
        .unwrap_err();
    assert_eq!(
        err,
        RegistryError::RelativePattern {
            pattern: "users".into()
        }
    );
    assert!(registry.is_empty());
}

#[test]
fn test_registry_rejects_unnamed_capture() {
    let mut registry = Registry::new();
    assert!(matches!(
        registry.register(Endpoint::new(Method::Get, "/users/:", target())),
        Err(RegistryError::UnnamedCapture { .. })
    ));
}

#[test]
fn test_merge_group_prefixes_in_order() {
    let mut group = RouteGroup::new();
    group.get("", noop);
    group.get("/:id", noop);
    group.post("/add", noop);

    let mut registry = Registry::new();
    registry
        .register(Endpoint::new(Method::Get, "/health", target()))
        .unwrap();
    registry.merge_group("/users", &group).unwrap();

    let patterns: Vec<(&str, Method)> = registry
        .list()
        .iter()
        .map(|e| (e.pattern(), e.method()))
        .collect();
    assert_eq!(
        patterns,
        vec![
            ("/health", Method::Get),
            ("/users", Method::Get),
            ("/users/:id", Method::Get),
            ("/users/add", Method::Post),
        ]
    );
}

#[test]
fn test_merge_group_is_all_or_nothing() {
    let mut group = RouteGroup::new();
    group.get("/ok", noop);
    group.get("/:", noop);

    let mut registry = Registry::new();
    assert!(registry.merge_group("/users", &group).is_err());
    assert!(registry.is_empty());
}

#[test]
fn test_first_path_match_wins_over_later_method_match() {
    let mut registry = Registry::new();
    registry
        .register(Endpoint::new(Method::Get, "/items/:id", target()))
        .unwrap();
    registry
        .register(Endpoint::new(Method::Post, "/items/:id", target()))
        .unwrap();
    let router = registry.freeze();

    match router.resolve(&http::Method::POST, "/items/9") {
        Resolution::MethodNotAllowed { endpoint } => assert_eq!(endpoint.method(), Method::Get),
        other => panic!("expected MethodNotAllowed, got {other:?}"),
    }
}

#[test]
fn test_exact_pass_precedes_pattern_pass() {
    let mut registry = Registry::new();
    registry
        .register(Endpoint::new(Method::Get, "/users/:id", target()))
        .unwrap();
    registry
        .register(Endpoint::new(Method::Post, "/users/add", target()))
        .unwrap();
    let router = registry.freeze();

    match router.resolve(&http::Method::POST, "/users/add") {
        Resolution::Matched { endpoint, params } => {
            assert_eq!(endpoint.pattern(), "/users/add");
            assert!(params.is_empty());
        }
        other => panic!("expected Matched, got {other:?}"),
    }
    assert!(matches!(
        router.resolve(&http::Method::POST, "/users/12"),
        Resolution::MethodNotAllowed { .. }
    ));
}

#[test]
fn test_not_found() {
    let mut registry = Registry::new();
    registry
        .register(Endpoint::new(Method::Get, "/users/:id", target()))
        .unwrap();
    let router = registry.freeze();
    assert!(matches!(
        router.resolve(&http::Method::GET, "/users/1/posts"),
        Resolution::NotFound
    ));
}

#[test]
fn test_method_parse_and_match() {
    assert_eq!("post".parse::<Method>().unwrap(), Method::Post);
    assert!("DELETE".parse::<Method>().is_err());
    assert!(Method::Put.matches(&http::Method::PUT));
    assert!(!Method::Put.matches(&http::Method::PATCH));
    assert_eq!(http::Method::from(Method::Get), http::Method::GET);
}
