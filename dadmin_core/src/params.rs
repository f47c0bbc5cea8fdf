use crate::error::AdapterError;
use crate::wire;
use std::collections::HashSet;

/// A single parameter value: a scalar, or a list that serializes
/// through the numeric-suffix convention (`key0`, `key1`, ...).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Scalar(String),
    List(Vec<String>),
}

/// Ordered request parameters.
///
/// Insertion order is preserved on the wire. `set`/`set_list` replace
/// any existing entry with the same key, so a key appears at most once.
#[derive(Clone, Debug, Default)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Override-by-key insert of a scalar value.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key.into(), Value::Scalar(value.into()));
        self
    }

    /// Override-by-key insert of a list value. Serialization expands it
    /// into `key0..key(n-1)` in the given order.
    pub fn set_list<I, V>(mut self, key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(key.into(), Value::List(values));
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert(&mut self, key: String, value: Value) {
        self.entries.retain(|(k, _)| *k != key);
        self.entries.push((key, value));
    }

    /// Flattens the map into wire pairs, expanding list values.
    ///
    /// Fails if two entries produce the same wire key, which can only
    /// happen between a scalar and an expanded list (entry keys
    /// themselves are unique by construction).
    pub fn expanded_pairs(&self) -> Result<Vec<(String, String)>, AdapterError> {
        let mut pairs: Vec<(String, String)> = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            match value {
                Value::Scalar(v) => pairs.push((key.clone(), v.clone())),
                Value::List(vs) => pairs.extend(wire::expand_list(key, vs)),
            }
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(pairs.len());
        for (k, _) in &pairs {
            if !seen.insert(k.as_str()) {
                return Err(AdapterError::ParamCollision { key: k.clone() });
            }
        }
        Ok(pairs)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params = params.set(k, v);
        }
        params
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn set_overrides_by_key_and_keeps_order() {
        let p = Params::new()
            .set("action", "create")
            .set("username", "jdoe")
            .set("action", "modify");
        let pairs = p.expanded_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("username".to_string(), "jdoe".to_string()),
                ("action".to_string(), "modify".to_string()),
            ]
        );
    }

    #[test]
    fn list_expands_with_numeric_suffixes_in_order() {
        let p = Params::new()
            .set("delete", "yes")
            .set_list("select", ["alice", "bob", "carol"]);
        let pairs = p.expanded_pairs().unwrap();
        assert_eq!(
            pairs,
            vec![
                ("delete".to_string(), "yes".to_string()),
                ("select0".to_string(), "alice".to_string()),
                ("select1".to_string(), "bob".to_string()),
                ("select2".to_string(), "carol".to_string()),
            ]
        );
    }

    #[test]
    fn scalar_colliding_with_expanded_key_is_rejected() {
        let p = Params::new()
            .set("select1", "stray")
            .set_list("select", ["alice", "bob"]);
        let err = p.expanded_pairs().unwrap_err();
        match err {
            AdapterError::ParamCollision { key } => assert_eq!(key, "select1"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_list_expands_to_nothing() {
        let p = Params::new().set_list("select", Vec::<String>::new());
        assert!(p.expanded_pairs().unwrap().is_empty());
    }
}
