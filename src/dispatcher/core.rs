use std::fmt;
use std::time::Instant;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::ids::RequestId;
use crate::middleware::Chain;
use crate::router::{Resolution, Router};
use crate::server::{parse_payload, InboundRequest, Request, Response};

pub const MALFORMED_BODY: &str = "Malformed JSON body";

/// Per-request dispatch states.
///
/// `PARSING -> MATCHING -> MISMATCHED | NOT_FOUND | MIDDLEWARE -> HANDLER`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Parsing,
    /// Terminal: the body could not be decoded.
    Malformed,
    Matching,
    /// Terminal: the first path match requires another method.
    Mismatched,
    /// Terminal: no endpoint path matched.
    NotFound,
    Middleware,
    /// The chain reached the endpoint (directly or through its pre-handler).
    Handler,
}

impl DispatchState {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchState::Parsing => "PARSING",
            DispatchState::Malformed => "MALFORMED",
            DispatchState::Matching => "MATCHING",
            DispatchState::Mismatched => "MISMATCHED",
            DispatchState::NotFound => "NOT_FOUND",
            DispatchState::Middleware => "MIDDLEWARE",
            DispatchState::Handler => "HANDLER",
        }
    }
}

impl fmt::Display for DispatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Serving-phase request processor: a frozen router plus a frozen
/// middleware chain.
///
/// `Dispatcher` is `Send + Sync` and cheap to clone; every connection
/// coroutine dispatches through the same instance without locking.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    chain: Chain,
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Router, chain: Chain) -> Self {
        info!(
            endpoints = router.endpoints().len(),
            middleware_count = chain.len(),
            "Dispatcher ready"
        );
        Self { router, chain }
    }

    #[must_use]
    pub fn router(&self) -> &Router {
        &self.router
    }

    #[must_use]
    pub fn chain(&self) -> &Chain {
        &self.chain
    }

    /// Run one request to completion and return its response.
    ///
    /// The response is unsent only when a middleware stage neither advanced
    /// the chain nor replied.
    pub fn dispatch(&self, inbound: InboundRequest) -> Response {
        self.dispatch_with_state(inbound).1
    }

    /// Like [`Dispatcher::dispatch`], also reporting the state the request
    /// finished in.
    pub fn dispatch_with_state(&self, inbound: InboundRequest) -> (DispatchState, Response) {
        let start = Instant::now();
        let request_id = RequestId::from_headers(&inbound.headers);
        let mut res = Response::new();

        debug!(request_id = %request_id, state = %DispatchState::Parsing, url = %inbound.url, "Dispatch");
        let payload = match parse_payload(&inbound.url, &inbound.body) {
            Ok(p) => p,
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    method = %inbound.method,
                    error = %e,
                    "Request body rejected"
                );
                res.reply(400, json!({ "message": MALFORMED_BODY }));
                return (DispatchState::Malformed, res);
            }
        };
        let mut req = Request::new(request_id, inbound, payload);

        debug!(request_id = %request_id, state = %DispatchState::Matching, "Dispatch");
        let state = match self.router.resolve(req.method(), req.path()) {
            Resolution::NotFound => {
                let message = format!("No definition for {}:{}", req.method(), req.path());
                info!(request_id = %request_id, state = %DispatchState::NotFound, "{message}");
                res.reply(404, json!({ "message": message }));
                DispatchState::NotFound
            }
            Resolution::MethodNotAllowed { endpoint } => {
                let message = format!(
                    "Could not {} {}, use {} instead",
                    req.method(),
                    req.path(),
                    endpoint.method()
                );
                info!(
                    request_id = %request_id,
                    state = %DispatchState::Mismatched,
                    pattern = %endpoint.pattern(),
                    "{message}"
                );
                res.reply(405, json!({ "message": message }));
                DispatchState::Mismatched
            }
            Resolution::Matched { endpoint, params } => {
                debug!(
                    request_id = %request_id,
                    state = %DispatchState::Middleware,
                    pattern = %endpoint.pattern(),
                    path_params = ?params,
                    middleware_count = self.chain.len(),
                    "Dispatch"
                );
                req.set_path_params(params);
                self.chain.run(&req, &mut res, endpoint.target());
                DispatchState::Handler
            }
        };

        debug!(
            request_id = %request_id,
            state = %state,
            status = ?res.status(),
            latency_us = start.elapsed().as_micros() as u64,
            "Dispatch complete"
        );
        (state, res)
    }
}
