use std::collections::HashMap;
use std::io::{self, Read};
use std::sync::Arc;

use may_minihttp::HttpService;
use serde_json::json;
use tracing::{debug, error, warn};

use super::request::InboundRequest;
use super::response::{write_response, Response};
use crate::dispatcher::Dispatcher;

/// `may_minihttp` service that feeds every request through a [`Dispatcher`].
///
/// Cloned once per connection; all clones share the same frozen dispatcher.
#[derive(Clone, Debug)]
pub struct AppService {
    dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

/// Read method, path, headers and body off the wire.
///
/// The body reader consumes the request, so it is read last.
fn read_inbound(req: may_minihttp::Request) -> io::Result<Option<InboundRequest>> {
    let method = match http::Method::from_bytes(req.method().as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!(method = %req.method(), "Unparseable request method");
            return Ok(None);
        }
    };
    let url = req.path().to_string();
    let headers: HashMap<String, String> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();
    debug!(
        header_count = headers.len(),
        header_names = ?headers.keys().take(20).collect::<Vec<_>>(),
        "Headers extracted"
    );

    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;

    Ok(Some(InboundRequest {
        method,
        url,
        headers,
        body,
    }))
}

impl HttpService for AppService {
    fn call(&mut self, req: may_minihttp::Request, res: &mut may_minihttp::Response) -> io::Result<()> {
        let Some(inbound) = read_inbound(req)? else {
            let mut response = Response::new();
            response.reply(400, json!({ "message": "Unsupported request method" }));
            write_response(res, response);
            return Ok(());
        };

        let method = inbound.method.clone();
        let url = inbound.url.clone();
        let mut response = self.dispatcher.dispatch(inbound);

        if !response.is_sent() {
            error!(
                method = %method,
                url = %url,
                "Request finished without a reply"
            );
            response.reply(500, json!({ "message": "No response was produced" }));
        }

        write_response(res, response);
        Ok(())
    }
}
