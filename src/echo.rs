use serde_json::json;

use crate::app::App;
use crate::server::{Request, Response};
use crate::validator::{string, validate, ValidatorOptions};

/// Replies with everything the dispatcher extracted from the request.
pub fn echo_handler(req: &Request, res: &mut Response) {
    res.ok(json!({
        "request_id": req.request_id(),
        "method": req.method().as_str(),
        "url": req.full_url(),
        "path": req.path(),
        "params": req.path_params(),
        "query": req.search_params(),
        "body": req.body(),
    }));
}

/// Liveness probe returning `{ "status": "ok" }`.
pub fn health_handler(_req: &Request, res: &mut Response) {
    res.ok(json!({ "status": "ok" }));
}

/// Endpoints served by the bundled binary.
///
/// Every `/echo` endpoint mirrors the request back. `POST /echo/messages`
/// requires a string `message` field. Paths are distinct per method because
/// the first endpoint whose path matches decides the outcome.
pub fn register_demo_routes(app: &mut App) {
    let message = validate([("message", string().required())], ValidatorOptions::default());
    app.get("/health", health_handler)
        .get("/echo", echo_handler)
        .post_validated("/echo/messages", message, echo_handler)
        .get("/echo/:id", echo_handler)
        .put("/echo/items/:id", echo_handler);
}
