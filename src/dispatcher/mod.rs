//! # Dispatcher Module
//!
//! Drives one inbound request from raw bytes to a [`Response`](crate::server::Response).
//!
//! ## Request Flow
//!
//! 1. **PARSING**: the query string and JSON body are decoded. A body that is
//!    not a JSON object ends the request with 400 `Malformed JSON body`.
//! 2. **MATCHING**: the [`Router`](crate::router::Router) resolves method and
//!    path. No path match gives 404; a path match with the wrong method gives
//!    405 naming the required method.
//! 3. **MIDDLEWARE**: captured path parameters are attached to the request
//!    and the global chain runs in registration order.
//! 4. **HANDLER**: the endpoint's pre-handler (if any) runs with the handler
//!    as its continuation, otherwise the handler runs directly.
//!
//! ## Concurrency
//!
//! A [`Dispatcher`] is immutable once built. The transport runs each request
//! in its own `may` coroutine and all of them share one dispatcher; no state
//! is shared between requests.
//!
//! ## Error Handling
//!
//! Parse, routing and validation failures become structured client replies.
//! Panics inside middleware or handlers are not caught here and propagate to
//! the coroutine running the request.

mod core;

pub use core::{DispatchState, Dispatcher, MALFORMED_BODY};
