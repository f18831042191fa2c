//! # Middleware Module
//!
//! Cross-cutting pipeline stages that run before an endpoint's handler.
//!
//! Every stage receives the request, the response and a [`Next`]
//! continuation. It either calls [`Next::run`] to advance or replies through
//! the response and returns, which halts the chain. The global chain
//! ([`Chain`]) ends at the matched endpoint; an endpoint registered with a
//! pre-handler runs that stage last, with the real handler as its
//! continuation.
//!
//! ```rust
//! use consume::middleware::Next;
//! use consume::server::{Request, Response};
//!
//! fn require_token(req: &Request, res: &mut Response, next: Next<'_>) {
//!     if req.header("authorization").is_some() {
//!         next.run(req, res);
//!     } else {
//!         res.forbidden(Some("missing token"));
//!     }
//! }
//! ```

mod core;
mod security_headers;
mod tracing;

pub use core::{Chain, Handler, Middleware, Next};
pub use security_headers::{SecureHeadersMiddleware, SECURE_HEADERS};
pub use tracing::{RequestLogMiddleware, TracingMiddleware};
