//! Endpoint registry and the frozen router built from it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use super::matcher::{match_path, CAPTURE_MARKER};
use crate::middleware::{Handler, Middleware};

/// HTTP methods an endpoint can be registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
}

impl Method {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
        }
    }

    /// Whether an inbound request method is this one.
    #[inline]
    #[must_use]
    pub fn matches(&self, method: &http::Method) -> bool {
        self.as_str() == method.as_str()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            _ => Err(RegistryError::UnsupportedMethod {
                method: s.to_string(),
            }),
        }
    }
}

impl From<Method> for http::Method {
    fn from(m: Method) -> Self {
        match m {
            Method::Get => http::Method::GET,
            Method::Post => http::Method::POST,
            Method::Put => http::Method::PUT,
        }
    }
}

/// Error raised while building the endpoint registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Registered patterns must be absolute (start with `/`).
    RelativePattern { pattern: String },
    /// A capture segment without a name, e.g. `/users/:`.
    UnnamedCapture { pattern: String },
    /// Only GET, POST and PUT endpoints can be registered.
    UnsupportedMethod { method: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::RelativePattern { pattern } => {
                write!(f, "route pattern '{pattern}' must start with '/'")
            }
            RegistryError::UnnamedCapture { pattern } => {
                write!(f, "route pattern '{pattern}' has a capture segment without a name")
            }
            RegistryError::UnsupportedMethod { method } => {
                write!(f, "unsupported method '{method}', expected GET, POST or PUT")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// What runs once the global middleware chain has completed.
///
/// Callers pick the variant at registration time; a pre-handler is a
/// middleware whose continuation is the endpoint's own handler.
#[derive(Clone)]
pub enum EndpointTarget {
    Handler(Arc<dyn Handler>),
    PreHandled {
        pre_handler: Arc<dyn Middleware>,
        handler: Arc<dyn Handler>,
    },
}

impl EndpointTarget {
    #[must_use]
    pub fn has_pre_handler(&self) -> bool {
        matches!(self, EndpointTarget::PreHandled { .. })
    }
}

impl fmt::Debug for EndpointTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndpointTarget::Handler(_) => f.write_str("Handler"),
            EndpointTarget::PreHandled { .. } => f.write_str("PreHandled"),
        }
    }
}

/// A registered (method, pattern, target) triple.
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: Method,
    pattern: String,
    target: EndpointTarget,
}

impl Endpoint {
    #[must_use]
    pub fn new(method: Method, pattern: impl Into<String>, target: EndpointTarget) -> Self {
        Self {
            method,
            pattern: pattern.into(),
            target,
        }
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn target(&self) -> &EndpointTarget {
        &self.target
    }

    fn with_prefix(&self, prefix: &str) -> Self {
        Self {
            method: self.method,
            pattern: format!("{prefix}{}", self.pattern),
            target: self.target.clone(),
        }
    }
}

fn check_pattern(pattern: &str) -> Result<(), RegistryError> {
    if !pattern.starts_with('/') {
        return Err(RegistryError::RelativePattern {
            pattern: pattern.to_string(),
        });
    }
    if pattern
        .split('/')
        .any(|segment| segment.len() == 1 && segment.starts_with(CAPTURE_MARKER))
    {
        return Err(RegistryError::UnnamedCapture {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

macro_rules! endpoint_shorthands {
    ($($method:ident, $with:ident => $variant:expr;)*) => {
        $(
            #[doc = concat!("Add a `", stringify!($method), "` endpoint.")]
            pub fn $method<H>(&mut self, pattern: &str, handler: H) -> &mut Self
            where
                H: Fn(&crate::server::Request, &mut crate::server::Response) + Send + Sync + 'static,
            {
                self.push($variant, pattern, EndpointTarget::Handler(Arc::new(handler)))
            }

            #[doc = concat!("Add a `", stringify!($method), "` endpoint guarded by a dedicated pre-handler.")]
            pub fn $with<P, H>(&mut self, pattern: &str, pre_handler: P, handler: H) -> &mut Self
            where
                P: for<'a> Fn(&crate::server::Request, &mut crate::server::Response, crate::middleware::Next<'a>)
                    + Send
                    + Sync
                    + 'static,
                H: Fn(&crate::server::Request, &mut crate::server::Response) + Send + Sync + 'static,
            {
                self.push(
                    $variant,
                    pattern,
                    EndpointTarget::PreHandled {
                        pre_handler: Arc::new(pre_handler),
                        handler: Arc::new(handler),
                    },
                )
            }
        )*
    };
}

pub(crate) use endpoint_shorthands;

/// Named collection of endpoints with patterns relative to a root.
///
/// Member patterns are not checked until the group is merged, so `""`
/// (the root itself) and `"/:id"` are both valid members.
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    endpoints: Vec<Endpoint>,
}

impl RouteGroup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an endpoint with an already-built target.
    pub fn push(&mut self, method: Method, pattern: &str, target: EndpointTarget) -> &mut Self {
        self.endpoints.push(Endpoint::new(method, pattern, target));
        self
    }

    endpoint_shorthands! {
        get, get_with => Method::Get;
        post, post_with => Method::Post;
        put, put_with => Method::Put;
    }

    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }
}

/// Ordered, append-only list of endpoints (building phase).
///
/// Registration order is significant: the router consults entries in this
/// order and the first path match decides the outcome. No conflict
/// detection is performed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    endpoints: Vec<Endpoint>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, endpoint: Endpoint) -> Result<(), RegistryError> {
        check_pattern(&endpoint.pattern)?;
        debug!(
            method = %endpoint.method,
            pattern = %endpoint.pattern,
            pre_handler = endpoint.target.has_pre_handler(),
            "Endpoint registered"
        );
        self.endpoints.push(endpoint);
        Ok(())
    }

    /// Append every member of `group` with `prefix` prepended to its pattern.
    ///
    /// The whole group is checked before anything is appended, so a bad
    /// member leaves the registry untouched.
    pub fn merge_group(&mut self, prefix: &str, group: &RouteGroup) -> Result<(), RegistryError> {
        let merged: Vec<Endpoint> = group
            .endpoints
            .iter()
            .map(|e| e.with_prefix(prefix))
            .collect();
        for endpoint in &merged {
            check_pattern(&endpoint.pattern)?;
        }
        info!(
            prefix = %prefix,
            endpoints = merged.len(),
            "Route group merged"
        );
        self.endpoints.extend(merged);
        Ok(())
    }

    #[must_use]
    pub fn list(&self) -> &[Endpoint] {
        &self.endpoints
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// End the building phase.
    #[must_use]
    pub fn freeze(self) -> Router {
        Router::new(self.endpoints)
    }
}

/// Outcome of resolving a request against the router.
#[derive(Debug)]
pub enum Resolution<'a> {
    /// Path and method matched; `params` holds the captured segments.
    Matched {
        endpoint: &'a Endpoint,
        params: HashMap<String, String>,
    },
    /// The first endpoint whose path matched requires another method.
    MethodNotAllowed { endpoint: &'a Endpoint },
    NotFound,
}

/// Immutable routing table (serving phase).
#[derive(Debug, Clone)]
pub struct Router {
    endpoints: Arc<[Endpoint]>,
}

impl Router {
    #[must_use]
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        let routes_summary: Vec<String> = endpoints
            .iter()
            .take(10)
            .map(|e| format!("{} {}", e.method, e.pattern))
            .collect();
        info!(
            routes_count = endpoints.len(),
            routes_summary = ?routes_summary,
            "Routing table loaded"
        );
        Self {
            endpoints: endpoints.into(),
        }
    }

    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Resolve `method` + `path` to an endpoint.
    ///
    /// Two passes are made over the endpoints in registration order. The
    /// first compares the path with each pattern verbatim, the second runs
    /// [`match_path`]. In each pass the first endpoint whose path matches
    /// decides: same method means a match, anything else is
    /// [`Resolution::MethodNotAllowed`] even when a later endpoint would have
    /// matched both.
    #[must_use]
    pub fn resolve(&self, method: &http::Method, path: &str) -> Resolution<'_> {
        if let Some(endpoint) = self.endpoints.iter().find(|e| e.pattern == path) {
            return Self::decide(endpoint, method, HashMap::new());
        }

        for endpoint in self.endpoints.iter() {
            let m = match_path(path, &endpoint.pattern);
            if m.is_match {
                return Self::decide(endpoint, method, m.params);
            }
        }

        Resolution::NotFound
    }

    fn decide<'a>(
        endpoint: &'a Endpoint,
        method: &http::Method,
        params: HashMap<String, String>,
    ) -> Resolution<'a> {
        if endpoint.method.matches(method) {
            Resolution::Matched { endpoint, params }
        } else {
            Resolution::MethodNotAllowed { endpoint }
        }
    }

    /// Print all registered routes to stdout.
    pub fn dump_routes(&self) {
        println!("[routes] count={}", self.endpoints.len());
        for endpoint in self.endpoints.iter() {
            println!(
                "[route] {} {}{}",
                endpoint.method,
                endpoint.pattern,
                if endpoint.target.has_pre_handler() {
                    " (pre-handler)"
                } else {
                    ""
                }
            );
        }
    }
}
