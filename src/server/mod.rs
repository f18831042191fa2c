//! Request/response model and the `may_minihttp` transport adapter.
//!
//! [`Request`] and [`Response`] are what middleware and handlers see.
//! [`AppService`] turns wire requests into [`InboundRequest`]s for the
//! dispatcher and writes the resulting [`Response`] back, and
//! [`HttpServer`] runs it on a socket.

mod cookie;
mod http_server;
mod request;
mod response;
mod service;

pub use cookie::{build_cookie, CookieOptions, SameSite};
pub use http_server::{HttpServer, ServerHandle};
pub use request::{
    parse_body, parse_cookies, parse_payload, parse_query_params, Body, InboundRequest, Params,
    ParseError, Payload, Request,
};
pub use response::{status_reason, write_response, Response, MAX_HEADERS};
pub use service::AppService;
