use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method, StatusCode};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
#[repr(u8)]
pub enum DebugLevel {
    #[default]
    None = 0,
    /// Request/response lines.
    V = 1,
    /// Plus headers and body previews.
    VV = 2,
}

impl DebugLevel {
    #[inline]
    pub fn is_verbose(self) -> bool {
        self >= DebugLevel::V
    }

    #[inline]
    pub fn is_very_verbose(self) -> bool {
        self >= DebugLevel::VV
    }
}

impl core::fmt::Display for DebugLevel {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            DebugLevel::None => f.write_str("none"),
            DebugLevel::V => f.write_str("v"),
            DebugLevel::VV => f.write_str("vv"),
        }
    }
}

const PREVIEW_MAX_CHARS: usize = 32 * 1024;

pub(crate) fn request_start(dbg: DebugLevel, method: &Method, url: &str, endpoint: &str) {
    eprintln!("[dadmin:{dbg}] -> {method} {url} ({endpoint})");
}

pub(crate) fn request_headers(dbg: DebugLevel, headers: &HeaderMap) {
    eprintln!("[dadmin:{dbg}] request headers:");
    for (k, v) in headers.iter() {
        eprintln!("  {}: {}", k, header_value_for_debug(k, v));
    }
}

pub(crate) fn request_body(dbg: DebugLevel, body: &[u8]) {
    let preview = truncate_for_debug(&String::from_utf8_lossy(body), PREVIEW_MAX_CHARS);
    eprintln!("[dadmin:{dbg}] request body ({} bytes): {preview}", body.len());
}

pub(crate) fn response_status(dbg: DebugLevel, status: StatusCode, url: &str, ok: bool) {
    let tag = if ok { "ok" } else { "error" };
    eprintln!("[dadmin:{dbg}] <- {} {url} ({tag})", status.as_u16());
}

pub(crate) fn response_headers(dbg: DebugLevel, headers: &HeaderMap) {
    eprintln!("[dadmin:{dbg}] response headers:");
    for (k, v) in headers.iter() {
        eprintln!("  {}: {}", k, header_value_for_debug(k, v));
    }
}

pub(crate) fn response_body(dbg: DebugLevel, headers: &HeaderMap, body: &[u8]) {
    let preview = crate::error::body_as_text(headers, body);
    let preview = truncate_for_debug(&preview, PREVIEW_MAX_CHARS);
    eprintln!("[dadmin:{dbg}] response body ({} bytes): {preview}", body.len());
}

fn is_sensitive_header_name(name: &HeaderName) -> bool {
    // HeaderName::as_str() is normalized to lowercase.
    let n = name.as_str();
    matches!(n, "authorization" | "proxy-authorization" | "cookie" | "set-cookie")
        || n.contains("token")
        || n.contains("secret")
        || n.ends_with("-key")
}

fn header_value_for_debug(name: &HeaderName, value: &HeaderValue) -> String {
    if is_sensitive_header_name(name) {
        "<redacted>".to_string()
    } else {
        value.to_str().unwrap_or("<non-utf8>").to_string()
    }
}

fn truncate_for_debug(s: &str, max_chars: usize) -> String {
    let mut it = s.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        match it.next() {
            Some(c) => out.push(c),
            None => return out,
        }
    }
    if it.next().is_some() {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod test {
    use super::*;
    use http::header::{ACCEPT, AUTHORIZATION, COOKIE};

    #[test]
    fn redacts_sensitive_headers_by_name() {
        assert!(is_sensitive_header_name(&AUTHORIZATION));
        assert!(is_sensitive_header_name(&COOKIE));
        assert!(is_sensitive_header_name(&HeaderName::from_static("x-api-key")));
        assert!(!is_sensitive_header_name(&ACCEPT));

        let secret = HeaderValue::from_static("Basic czNjcjN0");
        assert_eq!(header_value_for_debug(&AUTHORIZATION, &secret), "<redacted>");
        assert_eq!(
            header_value_for_debug(&ACCEPT, &HeaderValue::from_static("text/plain")),
            "text/plain"
        );
    }

    #[test]
    fn truncation_appends_ellipsis() {
        assert_eq!(truncate_for_debug("abcdef", 4), "abcd…");
        assert_eq!(truncate_for_debug("abc", 4), "abc");
    }
}
