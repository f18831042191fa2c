//! # consume
//!
//! **consume** is a small, coroutine-powered HTTP request dispatcher built on
//! the `may` runtime and `may_minihttp`.
//!
//! ## Overview
//!
//! A request goes through three tightly coupled pieces:
//!
//! - **Endpoint matching**: an ordered list of `(method, pattern)` endpoints,
//!   where `:name` segments capture path parameters and the first endpoint
//!   whose path matches decides between a match and a 405.
//! - **Middleware chaining**: global stages run in order, each either
//!   advancing the chain or replying; an endpoint may add its own pre-handler.
//! - **Payload validation**: per-field rules checked against the body, path
//!   parameters or query parameters, aggregated into a single 400 reply.
//!
//! ## Architecture
//!
//! - **[`router`]** - Pattern matcher, endpoint registry and route groups
//! - **[`middleware`]** - Middleware trait, chain executor, secure headers, tracing
//! - **[`validator`]** - Field validators and the payload validator middleware
//! - **[`dispatcher`]** - Per-request state machine from raw bytes to reply
//! - **[`server`]** - Request/response model, cookies and the `may_minihttp` adapter
//! - **[`app`]** - Building phase: registration that freezes into a dispatcher
//! - **[`runtime_config`]** / **[`otel`]** - Environment configuration and logging
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Server as HttpServer<br/>(may_minihttp)
//!     participant Dispatcher
//!     participant Router
//!     participant Chain as Middleware Chain
//!     participant Handler
//!
//!     Client->>Server: POST /users/add
//!     Server->>Dispatcher: InboundRequest
//!     Dispatcher->>Dispatcher: Parse query + JSON body
//!     alt Malformed body
//!         Dispatcher-->>Client: 400 Malformed JSON body
//!     end
//!     Dispatcher->>Router: resolve(method, path)
//!     alt No path match
//!         Router-->>Client: 404 No definition for POST:/users/add
//!     else Path matches, wrong method
//!         Router-->>Client: 405 Could not POST /users/add, use GET instead
//!     end
//!     Dispatcher->>Chain: run(request, response, endpoint)
//!     Chain->>Chain: Secure headers, tracing, user stages
//!     Chain->>Handler: pre-handler (validator) then handler
//!     Handler-->>Client: 200 JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use consume::app::App;
//! use consume::runtime_config::ServerOptions;
//! use consume::server::{AppService, HttpServer};
//! use serde_json::json;
//!
//! fn main() -> anyhow::Result<()> {
//!     let options = ServerOptions::from_env()?;
//!     let mut app = App::with_options(options.clone());
//!     app.get("/users/:id", |req, res| {
//!         res.ok(json!({ "id": req.path_param("id") }));
//!     });
//!
//!     let service = AppService::new(app.build()?);
//!     HttpServer(service)
//!         .start(options.addr.as_str())?
//!         .join()
//!         .map_err(|e| anyhow::anyhow!("{e:?}"))?;
//!     Ok(())
//! }
//! ```

pub mod app;
pub mod cli;
pub mod dispatcher;
pub mod echo;
pub mod ids;
pub mod middleware;
pub mod otel;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod validator;

pub use app::App;
pub use dispatcher::Dispatcher;
pub use ids::RequestId;
pub use middleware::{Middleware, Next};
pub use router::{match_path, Method, RouteGroup};
pub use server::{Request, Response};
