//! Parse results.
//!
//! [`RequestParser`](crate::RequestParser) writes into any [`ResultMap`].
//! The default is [`Namespace`], an insertion-ordered map with checked
//! access; plain `HashMap`, `BTreeMap`, `IndexMap` and JSON maps work too.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::ops::Index;

use indexmap::IndexMap;
use reqparse_core::Value;
use serde::Serialize;
use thiserror::Error;

/// A map a parser can write its results into.
pub trait ResultMap: Default {
    /// Stores `value` under `key`, replacing any previous value.
    fn insert_value(&mut self, key: String, value: Value);

    /// Returns `true` if `key` has been stored.
    fn has_key(&self, key: &str) -> bool;
}

/// Error returned by [`Namespace::require`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NamespaceError {
    /// No value was stored under the key.
    #[error("namespace has no attribute '{0}'")]
    MissingKey(String),
}

/// Parsed arguments, in declaration order.
///
/// # Example
///
/// ```rust
/// use reqparse::{Namespace, Value};
///
/// let mut ns = Namespace::new();
/// ns.insert("foo", "bar");
///
/// assert_eq!(ns["foo"], Value::from("bar"));
/// assert!(ns.require("missing").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    values: IndexMap<String, Value>,
}

impl Namespace {
    /// Creates an empty namespace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Returns the value stored under `key`, or an error naming it.
    ///
    /// # Errors
    ///
    /// Returns [`NamespaceError::MissingKey`] if nothing was stored.
    pub fn require(&self, key: &str) -> Result<&Value, NamespaceError> {
        self.values
            .get(key)
            .ok_or_else(|| NamespaceError::MissingKey(key.to_string()))
    }

    /// Stores a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    /// Removes a value, keeping the order of the rest.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.shift_remove(key)
    }

    /// Returns `true` if `key` has been stored.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over entries in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.values.iter()
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.values.keys()
    }

    /// Returns the underlying map.
    #[must_use]
    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.values
    }

    /// Converts to a JSON object.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.values
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}

impl Index<&str> for Namespace {
    type Output = Value;

    /// # Panics
    ///
    /// Panics if nothing is stored under `key`; use [`Namespace::require`]
    /// for a checked lookup.
    fn index(&self, key: &str) -> &Value {
        match self.values.get(key) {
            Some(value) => value,
            None => panic!("namespace has no attribute '{key}'"),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Namespace {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for Namespace {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.into_iter()
    }
}

impl<'a> IntoIterator for &'a Namespace {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}

impl ResultMap for Namespace {
    fn insert_value(&mut self, key: String, value: Value) {
        self.values.insert(key, value);
    }

    fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

impl<S: BuildHasher + Default> ResultMap for HashMap<String, Value, S> {
    fn insert_value(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }

    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl ResultMap for BTreeMap<String, Value> {
    fn insert_value(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }

    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl<S: BuildHasher + Default> ResultMap for IndexMap<String, Value, S> {
    fn insert_value(&mut self, key: String, value: Value) {
        self.insert(key, value);
    }

    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

impl ResultMap for serde_json::Map<String, serde_json::Value> {
    fn insert_value(&mut self, key: String, value: Value) {
        self.insert(key, value.to_json());
    }

    fn has_key(&self, key: &str) -> bool {
        self.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_get() {
        let mut ns = Namespace::new();
        assert!(ns.is_empty());
        assert_eq!(ns.insert("foo", "bar"), None);
        assert_eq!(ns.insert("foo", "baz"), Some(Value::from("bar")));
        assert_eq!(ns.get("foo"), Some(&Value::from("baz")));
        assert_eq!(ns.len(), 1);
        assert!(ns.contains_key("foo"));
    }

    #[test]
    fn test_require_missing_key() {
        let ns = Namespace::new();
        assert_eq!(
            ns.require("foo"),
            Err(NamespaceError::MissingKey("foo".to_string()))
        );
        assert_eq!(
            ns.require("foo").unwrap_err().to_string(),
            "namespace has no attribute 'foo'"
        );
    }

    #[test]
    #[should_panic(expected = "namespace has no attribute 'foo'")]
    fn test_index_missing_panics() {
        let ns = Namespace::new();
        let _ = &ns["foo"];
    }

    #[test]
    fn test_order_is_insertion_order() {
        let ns: Namespace = [("b", 1), ("a", 2), ("c", 3)].into_iter().collect();
        let keys: Vec<&String> = ns.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut ns: Namespace = [("a", 1), ("b", 2), ("c", 3)].into_iter().collect();
        assert_eq!(ns.remove("b"), Some(Value::Int(2)));
        let keys: Vec<String> = ns.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_serializes_as_object() {
        let mut ns = Namespace::new();
        ns.insert("foo", "bar");
        ns.insert("n", 3);
        ns.insert("none", Value::Null);
        assert_eq!(
            serde_json::to_value(&ns).unwrap(),
            json!({"foo": "bar", "n": 3, "none": null})
        );
        assert_eq!(ns.to_json(), json!({"foo": "bar", "n": 3, "none": null}));
    }

    #[test]
    fn test_result_map_impls() {
        fn fill<M: ResultMap>() -> M {
            let mut map = M::default();
            map.insert_value("foo".to_string(), Value::from("bar"));
            map
        }

        assert!(fill::<Namespace>().has_key("foo"));
        assert!(fill::<HashMap<String, Value>>().has_key("foo"));
        assert!(fill::<BTreeMap<String, Value>>().has_key("foo"));
        assert!(fill::<IndexMap<String, Value>>().has_key("foo"));

        let json_map = fill::<serde_json::Map<String, serde_json::Value>>();
        assert_eq!(json_map.get("foo"), Some(&json!("bar")));
    }
}
