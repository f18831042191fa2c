use std::time::Instant;

use tracing::{info, info_span, Span};

use super::{Middleware, Next};
use crate::server::{Request, Response};

/// Opens a `request` span around the remainder of the chain and records the
/// reply status and latency on it.
pub struct TracingMiddleware;

impl Middleware for TracingMiddleware {
    fn handle(&self, req: &Request, res: &mut Response, next: Next<'_>) {
        let span = info_span!(
            "request",
            request_id = %req.request_id(),
            method = %req.method(),
            path = %req.path(),
            status = tracing::field::Empty,
            latency_ms = tracing::field::Empty,
        );
        let start = Instant::now();
        {
            let _guard = span.enter();
            next.run(req, res);
        }
        record_outcome(&span, res, start);
    }
}

fn record_outcome(span: &Span, res: &Response, start: Instant) {
    if let Some(status) = res.status() {
        span.record("status", status);
    }
    span.record("latency_ms", start.elapsed().as_millis() as u64);
}

/// Logs the parsed request once per request before handing over to the rest of the chain.
pub struct RequestLogMiddleware;

impl Middleware for RequestLogMiddleware {
    fn handle(&self, req: &Request, res: &mut Response, next: Next<'_>) {
        info!(
            request_id = %req.request_id(),
            url = %req.full_url(),
            endpoint = %req.url(),
            method = %req.method(),
            headers = ?req.headers(),
            search_params = ?req.search_params(),
            path_params = ?req.path_params(),
            body = %serde_json::Value::Object(req.body().clone()),
            "Request received"
        );
        next.run(req, res);
    }
}
