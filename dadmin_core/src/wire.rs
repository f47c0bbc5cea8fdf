//! The panel's wire format: percent-encoded `key=value` records joined
//! by `&`, used for request bodies, query strings and most response
//! bodies alike.

use url::form_urlencoded;

/// Expands a list-valued field into the panel's numeric-suffix
/// convention: `key0`, `key1`, ... in the original order.
pub fn expand_list(key: &str, values: &[String]) -> Vec<(String, String)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (format!("{key}{i}"), v.clone()))
        .collect()
}

/// Serializes ordered pairs into a percent-encoded body/query string.
pub fn encode_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut ser = form_urlencoded::Serializer::new(String::new());
    for (k, v) in pairs {
        ser.append_pair(k, v);
    }
    ser.finish()
}

/// Decodes a response body into ordered pairs.
///
/// A body with no `=` anywhere is free text (log tails, empty success
/// bodies) and decodes to zero pairs; the caller keeps the raw body.
/// Otherwise every record is split on its *first* `=` and both sides
/// are percent-decoded, preserving encounter order. Values that embed a
/// sub-delimited list (comma- or pipe-joined) stay joined; the
/// delimiter's meaning is endpoint-specific and left to the caller.
pub fn decode_pairs(raw: &str) -> Vec<(String, String)> {
    if !raw.contains('=') {
        return Vec::new();
    }
    form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn expand_list_is_zero_based_and_ordered() {
        let vs: Vec<String> = vec!["a".into(), "b".into()];
        assert_eq!(
            expand_list("select", &vs),
            owned(&[("select0", "a"), ("select1", "b")])
        );
        assert!(expand_list("select", &[]).is_empty());
    }

    #[test]
    fn encode_percent_escapes_reserved_bytes() {
        let s = encode_pairs([("domain", "example.com"), ("note", "a b&c")]);
        assert_eq!(s, "domain=example.com&note=a+b%26c");
    }

    #[test]
    fn decode_preserves_encounter_order() {
        let pairs = decode_pairs("bandwidth=123&quota=45&vdomains=2");
        assert_eq!(
            pairs,
            owned(&[("bandwidth", "123"), ("quota", "45"), ("vdomains", "2")])
        );
    }

    #[test]
    fn decode_splits_on_first_equals_only() {
        let pairs = decode_pairs("a=1=2");
        assert_eq!(pairs, owned(&[("a", "1=2")]));
    }

    #[test]
    fn decode_percent_decodes_both_sides() {
        let pairs = decode_pairs("text=Some%20message&a%20b=c");
        assert_eq!(pairs, owned(&[("text", "Some message"), ("a b", "c")]));
    }

    #[test]
    fn free_text_decodes_to_nothing() {
        assert!(decode_pairs("").is_empty());
        assert!(decode_pairs("tail of some log file\nwith lines").is_empty());
    }

    #[test]
    fn enumeration_bodies_keep_empty_values() {
        let pairs = decode_pairs("user1=&user2=&user3=");
        assert_eq!(
            pairs,
            owned(&[("user1", ""), ("user2", ""), ("user3", "")])
        );
    }

    #[test]
    fn sub_delimited_values_stay_joined() {
        let pairs = decode_pairs("list=alice%7Cbob%7Ccarol");
        assert_eq!(pairs, owned(&[("list", "alice|bob|carol")]));
    }
}
