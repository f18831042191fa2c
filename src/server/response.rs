use std::collections::HashSet;
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::cookie::{build_cookie, CookieOptions};

/// Header lines handed to `may_minihttp` must be `'static`; lines are
/// interned so repeated values (the usual case) are leaked only once.
static HEADER_LINES: Lazy<Mutex<HashSet<&'static str>>> = Lazy::new(|| Mutex::new(HashSet::new()));

/// `may_minihttp` keeps a fixed-size header array; one slot is reserved for
/// `Content-Type`.
pub const MAX_HEADERS: usize = 15;

/// Outgoing reply, written once by middleware or a handler.
///
/// The first [`Response::reply`] closes the response: later replies and
/// header writes are ignored and logged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Value,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `status` and a JSON `body`.
    pub fn reply(&mut self, status: u16, body: Value) {
        if let Some(sent) = self.status {
            warn!(
                sent_status = sent,
                ignored_status = status,
                "Reply already sent; second reply ignored"
            );
            return;
        }
        debug!(status = status, "Reply written");
        self.status = Some(status);
        self.body = body;
    }

    pub fn ok(&mut self, body: Value) {
        self.reply(200, body);
    }

    /// 403 with `{"message": reason}`, `"Forbidden"` when no reason is given.
    pub fn forbidden(&mut self, reason: Option<&str>) {
        self.reply(403, json!({ "message": reason.unwrap_or("Forbidden") }));
    }

    /// Set a header, replacing any existing value with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        if self.closed("set_header", name) {
            return;
        }
        let value = value.into();
        match self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    /// Add a header without replacing earlier values (e.g. `Set-Cookie`).
    pub fn append_header(&mut self, name: &str, value: impl Into<String>) {
        if self.closed("append_header", name) {
            return;
        }
        self.headers.push((name.to_string(), value.into()));
    }

    /// Append a `Set-Cookie` header for `name=value`.
    pub fn set_cookie(&mut self, name: &str, value: &str, options: &CookieOptions) {
        let pair = format!(
            "{}={}",
            urlencoding::encode(name),
            urlencoding::encode(value)
        );
        self.append_header("Set-Cookie", build_cookie(&pair, options));
    }

    fn closed(&self, op: &str, name: &str) -> bool {
        if self.is_sent() {
            warn!(op = op, header = name, "Header write after reply ignored");
            return true;
        }
        false
    }

    #[must_use]
    pub fn is_sent(&self) -> bool {
        self.status.is_some()
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// First value of header `name` (case-insensitive).
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }
}

#[must_use]
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "OK",
    }
}

fn intern(line: String) -> &'static str {
    let mut lines = HEADER_LINES.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(existing) = lines.get(line.as_str()) {
        return *existing;
    }
    let leaked: &'static str = Box::leak(line.into_boxed_str());
    lines.insert(leaked);
    leaked
}

/// Write `response` to the transport, defaulting to 500 when nothing was
/// replied.
pub fn write_response(res: &mut may_minihttp::Response, response: Response) {
    let status = response.status.unwrap_or(500);
    res.status_code(usize::from(status), status_reason(status));
    res.header("Content-Type: application/json");

    if response.headers.len() > MAX_HEADERS {
        warn!(
            header_count = response.headers.len(),
            max_headers = MAX_HEADERS,
            "Too many response headers; extra headers dropped"
        );
    }
    for (name, value) in response.headers.into_iter().take(MAX_HEADERS) {
        res.header(intern(format!("{name}: {value}")));
    }

    match serde_json::to_vec(&response.body) {
        Ok(bytes) => res.body_vec(bytes),
        Err(e) => {
            warn!(error = %e, "Response body could not be serialized");
            res.body_vec(b"null".to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(403), "Forbidden");
        assert_eq!(status_reason(405), "Method Not Allowed");
    }

    #[test]
    fn test_first_reply_wins() {
        let mut res = Response::new();
        assert!(!res.is_sent());
        res.ok(json!({"a": 1}));
        res.reply(400, json!({"b": 2}));
        assert_eq!(res.status(), Some(200));
        assert_eq!(res.body(), &json!({"a": 1}));
    }

    #[test]
    fn test_forbidden_default_message() {
        let mut res = Response::new();
        res.forbidden(None);
        assert_eq!(res.status(), Some(403));
        assert_eq!(res.body(), &json!({"message": "Forbidden"}));

        let mut res = Response::new();
        res.forbidden(Some("no token"));
        assert_eq!(res.body(), &json!({"message": "no token"}));
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = Response::new();
        res.set_header("X-Frame-Options", "DENY");
        res.set_header("x-frame-options", "SAMEORIGIN");
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.header("X-FRAME-OPTIONS"), Some("SAMEORIGIN"));
    }

    #[test]
    fn test_headers_ignored_after_reply() {
        let mut res = Response::new();
        res.ok(Value::Null);
        res.set_header("X-Late", "1");
        assert!(res.header("X-Late").is_none());
    }

    #[test]
    fn test_set_cookie_appends() {
        let mut res = Response::new();
        res.set_cookie("a", "1", &CookieOptions::default());
        res.set_cookie(
            "b",
            "x y",
            &CookieOptions {
                http_only: true,
                ..Default::default()
            },
        );
        let cookies: Vec<&str> = res
            .headers()
            .iter()
            .filter(|(n, _)| n == "Set-Cookie")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(cookies, vec!["a=1", "b=x%20y; HttpOnly"]);
    }

    #[test]
    fn test_intern_reuses_lines() {
        let a = intern("X-Test: 1".to_string());
        let b = intern("X-Test: 1".to_string());
        assert!(std::ptr::eq(a, b));
    }
}
