use std::fmt;

use time::format_description::FormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};
use tracing::warn;

/// IMF-fixdate, e.g. `Sat, 31 Dec 2022 00:00:00 GMT`.
const HTTP_DATE: &[FormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// `SameSite` cookie attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        })
    }
}

/// Attributes appended to a `Set-Cookie` value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    pub expires: Option<OffsetDateTime>,
    pub http_only: bool,
    pub secure: bool,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub same_site: Option<SameSite>,
}

/// Append the attributes in `options` to `cookie`.
///
/// Attribute order is fixed: `Expires`, `HttpOnly`, `Secure`, `Path`,
/// `Domain`, `SameSite`. `Expires` is always rendered in GMT.
#[must_use]
pub fn build_cookie(cookie: &str, options: &CookieOptions) -> String {
    let mut out = cookie.to_string();
    if let Some(expires) = options.expires {
        match expires.to_offset(UtcOffset::UTC).format(HTTP_DATE) {
            Ok(date) => {
                out.push_str("; Expires=");
                out.push_str(&date);
            }
            Err(e) => warn!(error = %e, "Cookie expiry could not be formatted; attribute skipped"),
        }
    }
    if options.http_only {
        out.push_str("; HttpOnly");
    }
    if options.secure {
        out.push_str("; Secure");
    }
    if let Some(path) = &options.path {
        out.push_str("; Path=");
        out.push_str(path);
    }
    if let Some(domain) = &options.domain {
        out.push_str("; Domain=");
        out.push_str(domain);
    }
    if let Some(same_site) = options.same_site {
        out.push_str("; SameSite=");
        out.push_str(&same_site.to_string());
    }
    out
}
