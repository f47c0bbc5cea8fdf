use crate::mock::RecordedRequest;
use http::Method;
use http::header::HeaderName;
use std::fmt::Write as _;
use url::form_urlencoded;

pub struct RequestAssert<'a> {
    req: &'a RecordedRequest,
}

pub fn assert_request(req: &RecordedRequest) -> RequestAssert<'_> {
    RequestAssert { req }
}

impl<'a> RequestAssert<'a> {
    pub fn method(self, expected: Method) -> Self {
        if self.req.method != expected {
            panic!(
                "method mismatch\n  expected: {expected}\n  got: {}\n  url: {}",
                self.req.method, self.req.url
            );
        }
        self
    }

    pub fn endpoint(self, expected: &str) -> Self {
        if self.req.endpoint != expected {
            panic!(
                "endpoint mismatch\n  expected: {expected}\n  got: {}\n  url: {}",
                self.req.endpoint, self.req.url
            );
        }
        self
    }

    pub fn path(self, expected: &str) -> Self {
        let got = self.req.url.path();
        if got != expected {
            panic!(
                "path mismatch\n  expected: {expected}\n  got: {got}\n  url: {}",
                self.req.url
            );
        }
        self
    }

    pub fn timeout(self, expected: Option<std::time::Duration>) -> Self {
        if self.req.timeout != expected {
            panic!(
                "timeout mismatch\n  expected: {:?}\n  got: {:?}\n  url: {}",
                expected, self.req.timeout, self.req.url
            );
        }
        self
    }

    pub fn header(self, name: impl IntoHeaderName, expected: &str) -> Self {
        let name = name.into_header_name();
        let got = self.req.headers.get(&name).and_then(|v| v.to_str().ok());
        match got {
            Some(v) if v == expected => {}
            Some(v) => {
                panic!(
                    "header mismatch\n  header: {name}\n  expected: {expected}\n  got: {v}\n  url: {}",
                    self.req.url
                );
            }
            None => {
                panic!(
                    "missing header\n  header: {name}\n  expected: {expected}\n  url: {}",
                    self.req.url
                );
            }
        }
        self
    }

    pub fn header_absent(self, name: impl IntoHeaderName) -> Self {
        let name = name.into_header_name();
        if self.req.headers.contains_key(&name) {
            let got = self.req.headers.get(&name).and_then(|v| v.to_str().ok());
            panic!(
                "expected header absent\n  header: {name}\n  got: {got:?}\n  url: {}",
                self.req.url
            );
        }
        self
    }

    pub fn query_has(self, key: &str, expected_value: &str) -> Self {
        let pairs = self.query_pairs();
        if !pairs.iter().any(|(k, v)| k == key && v == expected_value) {
            panic!(
                "missing query pair\n  expected: {key}={expected_value}\n  got: {}\n  url: {}",
                format_pairs(&pairs),
                self.req.url
            );
        }
        self
    }

    pub fn query_absent(self, key: &str) -> Self {
        let pairs = self.query_pairs();
        if pairs.iter().any(|(k, _)| k == key) {
            panic!(
                "expected query key absent\n  key: {key}\n  got: {}\n  url: {}",
                format_pairs(&pairs),
                self.req.url
            );
        }
        self
    }

    /// Exact ordered comparison of the query string.
    pub fn query_exact(self, expected: &[(&str, &str)]) -> Self {
        let pairs = self.query_pairs();
        let exp: Vec<(String, String)> = expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if pairs != exp {
            panic!(
                "query mismatch\n  expected: {}\n  got: {}\n  url: {}",
                format_pairs(&exp),
                format_pairs(&pairs),
                self.req.url
            );
        }
        self
    }

    pub fn body_absent(self) -> Self {
        if self.req.body.is_some() {
            panic!("expected body absent, but body=Some(..)\nurl: {}", self.req.url);
        }
        self
    }

    pub fn body_has(self, key: &str, expected_value: &str) -> Self {
        let pairs = self.body_pairs();
        if !pairs.iter().any(|(k, v)| k == key && v == expected_value) {
            panic!(
                "missing form body pair\n  expected: {key}={expected_value}\n  got: {}\n  url: {}",
                format_pairs(&pairs),
                self.req.url
            );
        }
        self
    }

    pub fn body_lacks(self, key: &str) -> Self {
        let pairs = self.body_pairs();
        if pairs.iter().any(|(k, _)| k == key) {
            panic!(
                "expected form body key absent\n  key: {key}\n  got: {}\n  url: {}",
                format_pairs(&pairs),
                self.req.url
            );
        }
        self
    }

    /// Exact ordered comparison of the form body.
    pub fn body_exact(self, expected: &[(&str, &str)]) -> Self {
        let pairs = self.body_pairs();
        let exp: Vec<(String, String)> = expected
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        if pairs != exp {
            panic!(
                "form body mismatch\n  expected: {}\n  got: {}\n  url: {}",
                format_pairs(&exp),
                format_pairs(&pairs),
                self.req.url
            );
        }
        self
    }

    pub fn debug_dump(self) -> Self {
        eprintln!("{:#?}", self.req);
        self
    }

    fn query_pairs(&self) -> Vec<(String, String)> {
        self.req
            .url
            .query_pairs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn body_pairs(&self) -> Vec<(String, String)> {
        let body = self
            .req
            .body
            .as_ref()
            .unwrap_or_else(|| panic!("expected a form body\nurl: {}", self.req.url));
        form_urlencoded::parse(body)
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }
}

pub trait IntoHeaderName {
    fn into_header_name(self) -> HeaderName;
}

impl IntoHeaderName for HeaderName {
    fn into_header_name(self) -> HeaderName {
        self
    }
}

impl IntoHeaderName for &'static HeaderName {
    fn into_header_name(self) -> HeaderName {
        self.clone()
    }
}

impl IntoHeaderName for &'static str {
    fn into_header_name(self) -> HeaderName {
        HeaderName::from_bytes(self.as_bytes()).unwrap_or_else(|_| {
            panic!("invalid header name literal: {self:?}");
        })
    }
}

fn format_pairs(pairs: &[(String, String)]) -> String {
    let mut s = String::new();
    for (i, (k, v)) in pairs.iter().enumerate() {
        if i > 0 {
            s.push_str(", ");
        }
        let _ = write!(s, "{k}={v}");
    }
    s
}
