//! Building-phase entry point.
//!
//! An [`App`] collects global middleware and endpoints, then
//! [`App::build`] freezes both into a [`Dispatcher`]. Nothing can be
//! registered once the dispatcher exists.
//!
//! ```rust
//! use consume::app::App;
//! use consume::router::RouteGroup;
//! use consume::server::InboundRequest;
//! use consume::validator::{number, string, validate, ValidatorOptions};
//! use serde_json::json;
//!
//! let add_user = validate(
//!     [("firstname", string().required()), ("age", number().required())],
//!     ValidatorOptions::default(),
//! );
//!
//! let mut users = RouteGroup::new();
//! users.get("/:id", |req, res| res.ok(json!({ "id": req.path_param("id") })));
//!
//! let mut app = App::new();
//! app.post_validated("/users/add", add_user, |_req, res| res.ok(json!({ "added": true })))
//!     .route("/users", &users);
//!
//! let dispatcher = app.build().unwrap();
//! let res = dispatcher.dispatch(InboundRequest::new(http::Method::GET, "/users/7"));
//! assert_eq!(res.body(), &json!({ "id": "7" }));
//! ```

use std::sync::Arc;

use tracing::{error, info};

use crate::dispatcher::Dispatcher;
use crate::middleware::{
    Chain, Middleware, Next, RequestLogMiddleware, SecureHeadersMiddleware,
};
use crate::router::{
    endpoint_shorthands, Endpoint, EndpointTarget, Method, Registry, RegistryError, RouteGroup,
};
use crate::runtime_config::ServerOptions;
use crate::server::{Request, Response};

/// Collects middleware and endpoints before serving.
///
/// Registration methods chain. The first registration error is kept and
/// reported by [`App::build`]; later registrations are still attempted so
/// every problem is logged.
pub struct App {
    options: ServerOptions,
    registry: Registry,
    middleware: Vec<Arc<dyn Middleware>>,
    error: Option<RegistryError>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ServerOptions::default())
    }

    /// Start from `options`.
    ///
    /// With `use_secure_headers` the secure-headers middleware is installed
    /// first; with `log_requests` a request logger follows it.
    #[must_use]
    pub fn with_options(options: ServerOptions) -> Self {
        let mut app = Self {
            options,
            registry: Registry::new(),
            middleware: Vec::new(),
            error: None,
        };
        if app.options.use_secure_headers {
            app.use_middleware(SecureHeadersMiddleware);
        }
        if app.options.log_requests {
            app.use_middleware(RequestLogMiddleware);
        }
        app
    }

    #[must_use]
    pub fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Append a global middleware.
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Append a global middleware given as a closure.
    pub fn use_fn<F>(&mut self, middleware: F) -> &mut Self
    where
        F: for<'a> Fn(&Request, &mut Response, Next<'a>) + Send + Sync + 'static,
    {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Register an endpoint with an already-built target.
    pub fn push(&mut self, method: Method, pattern: &str, target: EndpointTarget) -> &mut Self {
        let result = self.registry.register(Endpoint::new(method, pattern, target));
        self.record(result)
    }

    endpoint_shorthands! {
        get, get_with => Method::Get;
        post, post_with => Method::Post;
        put, put_with => Method::Put;
    }

    /// `POST` endpoint whose pre-handler is a middleware value, typically a
    /// [`PayloadValidator`](crate::validator::PayloadValidator).
    pub fn post_validated<M, H>(&mut self, pattern: &str, pre_handler: M, handler: H) -> &mut Self
    where
        M: Middleware + 'static,
        H: Fn(&Request, &mut Response) + Send + Sync + 'static,
    {
        self.push(
            Method::Post,
            pattern,
            EndpointTarget::PreHandled {
                pre_handler: Arc::new(pre_handler),
                handler: Arc::new(handler),
            },
        )
    }

    /// Merge `group` with `prefix` prepended to each member pattern.
    pub fn route(&mut self, prefix: &str, group: &RouteGroup) -> &mut Self {
        let result = self.registry.merge_group(prefix, group);
        self.record(result)
    }

    fn record(&mut self, result: Result<(), RegistryError>) -> &mut Self {
        if let Err(e) = result {
            error!(error = %e, "Endpoint registration failed");
            self.error.get_or_insert(e);
        }
        self
    }

    #[must_use]
    pub fn endpoints(&self) -> &[Endpoint] {
        self.registry.list()
    }

    /// Freeze the registry and middleware list.
    ///
    /// # Errors
    ///
    /// Returns the first registration error, if any occurred.
    pub fn build(self) -> Result<Dispatcher, RegistryError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        info!(
            endpoints = self.registry.len(),
            middleware_count = self.middleware.len(),
            secure_headers = self.options.use_secure_headers,
            "Building dispatcher"
        );
        Ok(Dispatcher::new(
            self.registry.freeze(),
            Chain::new(self.middleware),
        ))
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("options", &self.options)
            .field("endpoints", &self.registry.len())
            .field("middleware", &self.middleware.len())
            .field("error", &self.error)
            .finish()
    }
}
