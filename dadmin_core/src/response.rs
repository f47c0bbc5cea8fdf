use crate::wire;
use bytes::Bytes;
use std::borrow::Cow;

const ERROR_KEY: &str = "error";
const TEXT_KEY: &str = "text";
const DETAILS_KEY: &str = "details";

/// Decoded panel response.
///
/// The panel answers HTTP 200 even on logical failure and signals it
/// through a reserved `error=1` record, so callers must branch on
/// [`has_error`](Response::has_error) before trusting [`data`](Response::data).
/// Decoding never fails: a body that does not parse as key/value
/// records — free text, or bytes that are not valid UTF-8 (log tails
/// can be) — simply yields empty `data` with [`raw`](Response::raw)
/// preserved byte-for-byte, which is what the log-tail endpoints rely on.
#[derive(Clone, Debug)]
pub struct Response {
    has_error: bool,
    error_message: Option<String>,
    error_details: Option<String>,
    data: Vec<(String, String)>,
    raw: Bytes,
}

impl Response {
    pub(crate) fn from_body(raw: Bytes) -> Self {
        let data = std::str::from_utf8(&raw)
            .map(wire::decode_pairs)
            .unwrap_or_default();
        let has_error = data
            .iter()
            .find(|(k, _)| k == ERROR_KEY)
            .is_some_and(|(_, v)| v == "1");

        let (error_message, error_details) = if has_error {
            let find = |key: &str| {
                data.iter()
                    .find(|(k, _)| k == key)
                    .map(|(_, v)| v.clone())
            };
            (find(TEXT_KEY), find(DETAILS_KEY))
        } else {
            (None, None)
        };

        Self {
            has_error,
            error_message,
            error_details,
            data,
            raw,
        }
    }

    /// True iff the body carried the panel's `error=1` indicator.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.has_error
    }

    /// The panel's short failure summary (`text=`), when present.
    #[inline]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The panel's long-form failure details (`details=`), when present.
    #[inline]
    pub fn error_details(&self) -> Option<&str> {
        self.error_details.as_deref()
    }

    /// First value stored under `key`, in encounter order.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.data
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Ordered key/value view of the body.
    pub fn data(&self) -> impl Iterator<Item = (&str, &str)> {
        self.data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Ordered top-level keys. Several endpoints return enumerations
    /// (`user1=&user2=`) where only the key carries meaning.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|(k, _)| k.as_str())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The untouched response body, byte-for-byte.
    #[inline]
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Lossy UTF-8 view of the raw body, for display.
    pub fn raw_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }

    #[inline]
    pub fn into_raw(self) -> Bytes {
        self.raw
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn decode(body: &'static str) -> Response {
        Response::from_body(Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn error_indicator_with_message_and_details() {
        let r = decode("error=1&text=Some%20message&details=Cannot%20create");
        assert!(r.has_error());
        assert_eq!(r.error_message(), Some("Some message"));
        assert_eq!(r.error_details(), Some("Cannot create"));
    }

    #[test]
    fn error_zero_and_absent_mean_success() {
        assert!(!decode("error=0&text=User%20created").has_error());
        assert!(!decode("bandwidth=123&quota=45").has_error());
    }

    #[test]
    fn message_keys_are_ignored_on_success() {
        let r = decode("error=0&text=all%20good");
        assert_eq!(r.error_message(), None);
        assert_eq!(r.get("text"), Some("all good"));
    }

    #[test]
    fn empty_body_is_a_successful_empty_response() {
        let r = Response::from_body(Bytes::new());
        assert!(!r.has_error());
        assert!(r.is_empty());
        assert_eq!(r.keys().count(), 0);
        assert_eq!(r.raw(), b"");
    }

    #[test]
    fn keys_mirror_data_in_encounter_order() {
        let r = decode("user1=&user2=&user3=");
        let keys: Vec<&str> = r.keys().collect();
        assert_eq!(keys, vec!["user1", "user2", "user3"]);
        let data_keys: Vec<&str> = r.data().map(|(k, _)| k).collect();
        assert_eq!(keys, data_keys);
    }

    #[test]
    fn raw_is_preserved_even_for_free_text() {
        let body = "10 lines of error_log\nno key value records here";
        let r = decode(body);
        assert!(r.is_empty());
        assert_eq!(r.raw(), body.as_bytes());
    }

    #[test]
    fn non_utf8_bodies_round_trip_byte_for_byte() {
        // access-log tails can carry raw request bytes
        let body: &[u8] = b"GET /\xff HTTP/1.0\n";
        let r = Response::from_body(Bytes::from_static(body));
        assert!(!r.has_error());
        assert!(r.is_empty());
        assert_eq!(r.raw(), body);
        assert_eq!(r.raw_text(), "GET /\u{fffd} HTTP/1.0\n");

        // a stray invalid byte also disables record parsing, not raw
        let body: &[u8] = b"a=1&\xffjunk=2";
        let r = Response::from_body(Bytes::from_static(body));
        assert!(r.is_empty());
        assert_eq!(r.raw(), body);
    }

    #[test]
    fn value_with_embedded_equals_is_not_resplit() {
        let r = decode("a=1=2");
        assert_eq!(r.get("a"), Some("1=2"));
    }
}
