use super::{Middleware, Next};
use crate::server::{Request, Response};

/// Baseline security headers applied to every response.
pub const SECURE_HEADERS: [(&str, &str); 8] = [
    (
        "Content-Security-Policy",
        "default-src 'self'; script-src 'self'; object-src 'none';",
    ),
    ("X-DNS-Prefetch-Control", "off"),
    ("X-Frame-Options", "DENY"),
    (
        "Strict-Transport-Security",
        "max-age=31536000; includeSubDomains",
    ),
    ("X-Download-Options", "noopen"),
    ("X-Content-Type-Options", "nosniff"),
    ("Referrer-Policy", "no-referrer"),
    ("X-Permitted-Cross-Domain-Policies", "none"),
];

/// Sets [`SECURE_HEADERS`] and continues.
///
/// Installed first in the global chain when secure headers are enabled, so
/// even early replies (validation failures, `forbidden`) carry them.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecureHeadersMiddleware;

impl Middleware for SecureHeadersMiddleware {
    fn handle(&self, req: &Request, res: &mut Response, next: Next<'_>) {
        for (name, value) in SECURE_HEADERS {
            res.set_header(name, value);
        }
        next.run(req, res);
    }
}
