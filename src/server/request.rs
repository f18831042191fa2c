use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::ids::RequestId;

/// String-keyed parameters (path captures or query string).
pub type Params = HashMap<String, String>;

/// Decoded request body: a JSON object, empty when no body was sent.
pub type Body = Map<String, Value>;

/// Raw request as delivered by the transport layer.
#[derive(Debug, Clone)]
pub struct InboundRequest {
    pub method: http::Method,
    /// Path as received, including any query string.
    pub url: String,
    /// Header names are stored lowercase.
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl InboundRequest {
    #[must_use]
    pub fn new(method: http::Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Shorthand for a JSON body with the matching content type.
    #[must_use]
    pub fn json(self, body: &Value) -> Self {
        self.header("content-type", "application/json")
            .body(body.to_string())
    }
}

/// Failure to decode the inbound payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The body is not valid JSON.
    MalformedBody { reason: String },
    /// The body is valid JSON but not an object.
    NotAnObject { found: &'static str },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedBody { reason } => write!(f, "malformed JSON body: {reason}"),
            ParseError::NotAnObject { found } => {
                write!(f, "JSON body must be an object, found {found}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Body and query string decoded from one inbound request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub body: Body,
    pub search_params: Params,
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Decode a raw body into a JSON object.
///
/// An empty body yields an empty object.
pub fn parse_body(raw: &[u8]) -> Result<Body, ParseError> {
    if raw.is_empty() {
        return Ok(Body::new());
    }
    let value: Value =
        serde_json::from_slice(raw).map_err(|e| ParseError::MalformedBody {
            reason: e.to_string(),
        })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(ParseError::NotAnObject {
            found: kind_of(&other),
        }),
    }
}

/// Parse query string parameters from a URL path
///
/// Extracts everything after the `?` character and URL-decodes parameter
/// names and values. Repeated names keep the last value.
pub fn parse_query_params(url: &str) -> Params {
    match url.split_once('?') {
        Some((_, query)) => url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Params::new(),
    }
}

/// Decode query string and body of an inbound request.
pub fn parse_payload(url: &str, raw_body: &[u8]) -> Result<Payload, ParseError> {
    let search_params = parse_query_params(url);
    let body = parse_body(raw_body)?;
    debug!(
        param_count = search_params.len(),
        body_fields = body.len(),
        "Payload parsed"
    );
    Ok(Payload {
        body,
        search_params,
    })
}

/// Parse the `Cookie` header into name/value pairs, URL-decoding both.
pub fn parse_cookies(headers: &HashMap<String, String>) -> Params {
    headers
        .get("cookie")
        .map(|c| {
            c.split(';')
                .filter_map(|pair| {
                    let (name, value) = pair.trim().split_once('=')?;
                    Some((decode(name.trim()), decode(value.trim())))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

/// Per-request context seen by middleware and handlers.
///
/// Path parameters are filled in once by the dispatcher after matching;
/// everything is read-only from then on.
#[derive(Debug, Clone)]
pub struct Request {
    request_id: RequestId,
    method: http::Method,
    url: String,
    headers: HashMap<String, String>,
    body: Body,
    path_params: Params,
    search_params: Params,
}

impl Request {
    #[must_use]
    pub fn new(request_id: RequestId, inbound: InboundRequest, payload: Payload) -> Self {
        Self {
            request_id,
            method: inbound.method,
            url: inbound.url,
            headers: inbound.headers,
            body: payload.body,
            path_params: Params::new(),
            search_params: payload.search_params,
        }
    }

    pub(crate) fn set_path_params(&mut self, params: Params) {
        self.path_params = params;
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    #[must_use]
    pub fn method(&self) -> &http::Method {
        &self.method
    }

    /// Path and query string as received.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or("/")
    }

    /// `http://{host}{url}`, using the `Host` header.
    #[must_use]
    pub fn full_url(&self) -> String {
        if self.url.is_empty() {
            return String::new();
        }
        let host = self.header("host").unwrap_or("localhost");
        format!("http://{host}{}", self.url)
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    #[must_use]
    pub fn body(&self) -> &Body {
        &self.body
    }

    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }

    #[must_use]
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn search_params(&self) -> &Params {
        &self.search_params
    }

    #[must_use]
    pub fn search_param(&self, name: &str) -> Option<&str> {
        self.search_params.get(name).map(String::as_str)
    }

    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<String> {
        parse_cookies(&self.headers).remove(name)
    }

    #[must_use]
    pub fn cookies(&self) -> Params {
        parse_cookies(&self.headers)
    }

    /// Deserialize the body into `T`.
    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.body.clone()))
    }

    /// Deserialize the path parameters into `T` (all values are strings).
    pub fn parse_path_params<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        params_into(&self.path_params)
    }

    /// Deserialize the query parameters into `T` (all values are strings).
    pub fn parse_search_params<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        params_into(&self.search_params)
    }
}

fn params_into<T: DeserializeOwned>(params: &Params) -> Result<T, serde_json::Error> {
    let map: Map<String, Value> = params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();
    serde_json::from_value(Value::Object(map))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn request(inbound: InboundRequest) -> Request {
        let payload = parse_payload(&inbound.url, &inbound.body).unwrap();
        Request::new(RequestId::new(), inbound, payload)
    }

    #[test]
    fn test_parse_query_params() {
        let q = parse_query_params("/search?query=apple&category=fruits");
        assert_eq!(q.get("query"), Some(&"apple".to_string()));
        assert_eq!(q.get("category"), Some(&"fruits".to_string()));
    }

    #[test]
    fn test_parse_query_params_empty() {
        assert!(parse_query_params("/search").is_empty());
        assert!(parse_query_params("/search?").is_empty());
    }

    #[test]
    fn test_parse_query_params_decodes() {
        let q = parse_query_params("/search?query=hello%20world&category=food%26drink");
        assert_eq!(q["query"], "hello world");
        assert_eq!(q["category"], "food&drink");
    }

    #[test]
    fn test_parse_body() {
        assert!(parse_body(b"").unwrap().is_empty());
        let body = parse_body(br#"{"foo": "x", "n": 1}"#).unwrap();
        assert_eq!(body["foo"], json!("x"));
        assert_eq!(body["n"], json!(1));
    }

    #[test]
    fn test_parse_body_rejects_malformed() {
        assert!(matches!(
            parse_body(b"{not json"),
            Err(ParseError::MalformedBody { .. })
        ));
        assert!(matches!(
            parse_body(b"   "),
            Err(ParseError::MalformedBody { .. })
        ));
        assert_eq!(
            parse_body(b"[1, 2]"),
            Err(ParseError::NotAnObject { found: "array" })
        );
    }

    #[test]
    fn test_parse_cookies() {
        let mut h = HashMap::new();
        h.insert("cookie".to_string(), "a=b; token=x%20y; broken".to_string());
        let cookies = parse_cookies(&h);
        assert_eq!(cookies.get("a"), Some(&"b".to_string()));
        assert_eq!(cookies.get("token"), Some(&"x y".to_string()));
        assert_eq!(cookies.len(), 2);
    }

    #[test]
    fn test_request_accessors() {
        let req = request(
            InboundRequest::new(http::Method::GET, "/users/1?verbose=true")
                .header("Host", "example.com")
                .header("Cookie", "session=abc"),
        );
        assert_eq!(req.path(), "/users/1");
        assert_eq!(req.url(), "/users/1?verbose=true");
        assert_eq!(req.full_url(), "http://example.com/users/1?verbose=true");
        assert_eq!(req.header("HOST"), Some("example.com"));
        assert_eq!(req.search_param("verbose"), Some("true"));
        assert_eq!(req.get_cookie("session").as_deref(), Some("abc"));
        assert!(req.get_cookie("missing").is_none());
        assert!(req.body().is_empty());
    }

    #[test]
    fn test_typed_accessors() {
        #[derive(Deserialize)]
        struct User {
            firstname: String,
            age: u32,
        }
        #[derive(Deserialize)]
        struct Query {
            page: String,
        }

        let req = request(
            InboundRequest::new(http::Method::POST, "/users?page=2")
                .json(&json!({"firstname": "Ada", "age": 36})),
        );
        let user: User = req.parse_body().unwrap();
        assert_eq!(user.firstname, "Ada");
        assert_eq!(user.age, 36);
        let query: Query = req.parse_search_params().unwrap();
        assert_eq!(query.page, "2");
    }
}
