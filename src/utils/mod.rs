//! Utility functions and helpers.

pub mod http;
pub mod normalize;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Characters left unescaped in search queries (`_.-~/`).
const QUERY_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~')
    .remove(b'/');

/// Percent-encode a product name for use in a search URL.
pub fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, QUERY_SAFE).to_string()
}

/// Turn a scraped href into an absolute URL.
///
/// Absolute hrefs are kept as-is and protocol-relative ones take the base
/// URL's scheme. Anything else is prefixed with `base_url`.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return href.to_string();
    }
    if href.starts_with("//") {
        if let Ok(joined) = Url::parse(base_url).and_then(|base| base.join(href)) {
            return joined.to_string();
        }
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}
