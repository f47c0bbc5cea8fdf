use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD as B64;
use http::{HeaderMap, StatusCode};
use std::error::Error;
use thiserror::Error;

pub type BoxError = Box<dyn Error + Send + Sync>;

/// Hard failures of a panel call.
///
/// An application-level failure (the panel answering `error=1` inside a
/// 200 body) is *not* represented here; it is carried inside
/// [`Response`](crate::prelude::Response) and callers branch on
/// `has_error()`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AdapterError {
    #[error("invalid context: {0}")]
    InvalidContext(&'static str),

    /// A scalar parameter collides with a key produced by list
    /// expansion (e.g. scalar `select0` next to list `select`).
    #[error("parameter key collision: {key}")]
    ParamCollision { key: String },

    #[error("build url error: {0}")]
    BuildUrl(#[from] url::ParseError),

    #[error("transport: {0}")]
    Transport(#[from] crate::transport::TransportError),

    #[error("status {status}")]
    HttpStatus {
        status: StatusCode,
        headers: HeaderMap,
        body: String,
    },

    #[error("in endpoint {endpoint}: {source}")]
    InEndpoint {
        endpoint: String,
        source: Box<AdapterError>,
    },
}

impl AdapterError {
    #[inline]
    pub fn in_endpoint(endpoint: &str, e: AdapterError) -> AdapterError {
        match e {
            AdapterError::InEndpoint { .. } => e,
            _ => AdapterError::InEndpoint {
                endpoint: endpoint.to_owned(),
                source: Box::new(e),
            },
        }
    }
}

/// Bounded preview of a response body for error reporting and debug
/// output. Text bodies are shown as UTF-8, anything else as base64.
pub fn body_as_text(headers: &HeaderMap, body: &[u8]) -> String {
    const MAX: usize = 8 * 1024;
    let ct = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let slice = if body.len() > MAX { &body[..MAX] } else { body };
    // The panel answers text/plain or text/html; anything else is unexpected.
    if ct.is_empty() || ct.starts_with("text/") || ct.starts_with("application/x-www-form-urlencoded") {
        match std::str::from_utf8(slice) {
            Ok(s) => {
                if body.len() > slice.len() {
                    format!("{}...", s)
                } else {
                    s.to_owned()
                }
            }
            // error_len() == None: the slice ends inside a character,
            // i.e. the cut clipped it. Keep the valid prefix.
            Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => {
                let s = std::str::from_utf8(&slice[..e.valid_up_to()]).unwrap_or("");
                format!("{}...", s)
            }
            Err(_) => format!("<non-utf8-text; {} bytes>", slice.len()),
        }
    } else {
        let b64 = B64.encode(slice);
        format!(
            "<non-text; {} bytes; base64:{}{}>",
            body.len(),
            &b64[..b64.len().min(1024)],
            if b64.len() > 1024 { "..." } else { "" }
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use http::header::CONTENT_TYPE;

    #[test]
    fn in_endpoint_does_not_double_wrap() {
        let inner = AdapterError::InvalidContext("empty host");
        let wrapped = AdapterError::in_endpoint("CMD_API_SHOW_USERS", inner);
        let again = AdapterError::in_endpoint("CMD_API_OTHER", wrapped);
        match again {
            AdapterError::InEndpoint { endpoint, .. } => {
                assert_eq!(endpoint, "CMD_API_SHOW_USERS");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn body_preview_text_and_binary() {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());
        assert_eq!(body_as_text(&headers, b"error=1&text=no"), "error=1&text=no");

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "application/octet-stream".parse().unwrap());
        let s = body_as_text(&headers, &[0x00, 0x01, 0x02]);
        assert!(s.starts_with("<non-text; 3 bytes; base64:"));
    }

    #[test]
    fn preview_cut_backs_off_to_a_char_boundary() {
        const MAX: usize = 8 * 1024;
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, "text/plain".parse().unwrap());

        // 'é' straddles the cut: its first byte is slice[MAX - 1]
        let mut body = "a".repeat(MAX - 1);
        body.push_str("ééé");
        let s = body_as_text(&headers, body.as_bytes());
        assert_eq!(s, format!("{}...", "a".repeat(MAX - 1)));

        // a genuinely invalid byte inside the cut still degrades
        let mut body = vec![b'a'; MAX + 16];
        body[10] = 0xFF;
        let s = body_as_text(&headers, &body);
        assert_eq!(s, format!("<non-utf8-text; {} bytes>", MAX));
    }
}
